//! Due date parsing and formatting.
//!
//! `parse_due_date` never fails: unrecognised input falls back to two days
//! from now. Fixed literals are checked first, then strict `YYYY-MM-DD`, then
//! a small natural-language vocabulary.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeDelta, TimeZone};

/// Default offset applied to blank, `default` or unparseable input.
pub const DEFAULT_DUE_HOURS: i64 = 48;

/// Resolve free text typed on the due date screen into a due timestamp.
pub fn parse_due_date(input: &str, now: DateTime<Local>) -> DateTime<Local> {
    let s = input.trim().to_lowercase();
    let fallback = now + Duration::hours(DEFAULT_DUE_HOURS);

    match s.as_str() {
        "" | "default" => return fallback,
        "today" => return now,
        "tomorrow" => return now + Duration::hours(24),
        "next week" => return now + Duration::days(7),
        _ => {}
    }

    if let Ok(date) = NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        return start_of_day(date).unwrap_or(fallback);
    }

    parse_natural_date(&s, now.date_naive())
        .and_then(start_of_day)
        .unwrap_or(fallback)
}

/// Local midnight of `date`, or the earliest valid instant on a DST gap.
fn start_of_day(date: NaiveDate) -> Option<DateTime<Local>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Local.from_local_datetime(&midnight).earliest()
}

/// Parse human-readable date phrases relative to `today`.
///
/// Supports:
/// - "yesterday"
/// - "monday", "next monday", "this friday" (and three-letter forms)
/// - "end of week" / "eow", "end of month" / "eom", "weekend"
/// - "in 3d", "in 2w", "in 1m"
pub fn parse_natural_date(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "yesterday" => return Some(today - Duration::days(1)),
        "end of week" | "eow" => {
            let (_, end) = start_end_of_week(today);
            return Some(end);
        }
        "end of month" | "eom" => {
            let (year, month) = if today.month() == 12 {
                (today.year() + 1, 1)
            } else {
                (today.year(), today.month() + 1)
            };
            let first_of_next = NaiveDate::from_ymd_opt(year, month, 1)?;
            return Some(first_of_next - Duration::days(1));
        }
        "this weekend" | "weekend" => {
            let days_until_saturday = (5 + 7 - today.weekday().num_days_from_monday()) % 7;
            return Some(today + Duration::days(days_until_saturday as i64));
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        return parse_offset(rest.trim(), today);
    }

    let weekdays: [(&str, i64); 14] = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
        ("mon", 0), ("tue", 1), ("wed", 2), ("thu", 3),
        ("fri", 4), ("sat", 5), ("sun", 6),
    ];

    let current = today.weekday().num_days_from_monday() as i64;
    for (name, target) in weekdays {
        let days_ahead = (target + 7 - current) % 7;
        if s == name || s == format!("this {name}") {
            return Some(today + Duration::days(days_ahead));
        }
        if s == format!("next {name}") {
            let days = if days_ahead == 0 { 7 } else { days_ahead + 7 };
            return Some(today + Duration::days(days));
        }
    }

    None
}

/// "3d", "2w" or "1m" added to `today`. Amounts too large for a calendar
/// date yield `None`.
fn parse_offset(rest: &str, today: NaiveDate) -> Option<NaiveDate> {
    let (split, _) = rest.char_indices().last()?;
    let (amount, unit) = rest.split_at(split);
    let n = amount.trim().parse::<i64>().ok()?;
    let delta = match unit {
        "d" => TimeDelta::try_days(n)?,
        "w" => TimeDelta::try_weeks(n)?,
        // Approximate: 30 days per month
        "m" => TimeDelta::try_days(n.checked_mul(30)?)?,
        _ => return None,
    };
    today.checked_add_signed(delta)
}

/// The Monday and Sunday bounding the ISO week that contains `today`.
pub fn start_end_of_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    (start, start + Duration::days(6))
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: DateTime<Local>, today: NaiveDate) -> String {
    let days = (due.date_naive() - today).num_days();
    match days {
        0 => "today".into(),
        1 => "tomorrow".into(),
        d if d > 1 => format!("in {d}d"),
        d => format!("{}d late", -d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wednesday_noon() -> DateTime<Local> {
        // ISO week 10 of 2025.
        Local.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_fixed_literals() {
        let now = wednesday_noon();
        assert_eq!(parse_due_date("", now), now + Duration::hours(48));
        assert_eq!(parse_due_date("  Default ", now), now + Duration::hours(48));
        assert_eq!(parse_due_date("TODAY", now), now);
        assert_eq!(parse_due_date("tomorrow", now), now + Duration::hours(24));
        assert_eq!(parse_due_date(" Next Week", now), now + Duration::days(7));
    }

    #[test]
    fn test_iso_date_is_local_midnight() {
        let now = wednesday_noon();
        let due = parse_due_date("2025-04-01", now);
        assert_eq!(due.date_naive(), NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        assert_eq!(due.time(), chrono::NaiveTime::MIN);
    }

    #[test]
    fn test_natural_language_fallbacks() {
        let now = wednesday_noon();
        let friday = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(parse_due_date("friday", now).date_naive(), friday);
        assert_eq!(parse_due_date("next friday", now).date_naive(), friday + Duration::days(7));
        assert_eq!(parse_due_date("in 3d", now).date_naive(), now.date_naive() + Duration::days(3));
        assert_eq!(parse_due_date("eow", now).date_naive(), NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
        assert_eq!(parse_due_date("eom", now).date_naive(), NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
    }

    #[test]
    fn test_unparseable_input_falls_back() {
        let now = wednesday_noon();
        assert_eq!(parse_due_date("whenever", now), now + Duration::hours(48));
        assert_eq!(parse_due_date("2025-13-45", now), now + Duration::hours(48));
        assert_eq!(parse_due_date("in xd", now), now + Duration::hours(48));
    }

    #[test]
    fn test_out_of_range_offsets_fall_back() {
        let now = wednesday_noon();
        let fallback = now + Duration::hours(48);
        for input in [
            "in 99999999d",
            "in 9999999999999999d",
            "in 99999999999999w",
            "in 999999999999999999m",
            "in 9223372036854775807d",
            "in -9223372036854775808m",
        ] {
            assert_eq!(parse_due_date(input, now), fallback, "{input}");
        }
    }

    #[test]
    fn test_negative_offset_is_in_the_past() {
        let now = wednesday_noon();
        let today = now.date_naive();
        assert_eq!(parse_due_date("in -3d", now).date_naive(), today - Duration::days(3));
        assert_eq!(parse_natural_date("in -1w", today), Some(today - Duration::days(7)));
        assert_eq!(parse_natural_date("in 2m", today), Some(today + Duration::days(60)));
    }

    #[test]
    fn test_same_weekday_means_today_or_next_week() {
        let today = wednesday_noon().date_naive();
        assert_eq!(parse_natural_date("wednesday", today), Some(today));
        assert_eq!(parse_natural_date("next wed", today), Some(today + Duration::days(7)));
        assert_eq!(parse_natural_date("weekend", today), Some(today + Duration::days(3)));
    }

    #[test]
    fn test_format_due_relative() {
        let now = wednesday_noon();
        let today = now.date_naive();
        assert_eq!(format_due_relative(now, today), "today");
        assert_eq!(format_due_relative(now + Duration::days(1), today), "tomorrow");
        assert_eq!(format_due_relative(now + Duration::days(4), today), "in 4d");
        assert_eq!(format_due_relative(now - Duration::days(2), today), "2d late");
    }
}
