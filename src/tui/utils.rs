//! Cursor bounding helpers shared by every list screen.
//!
//! Cursors never wrap: moving up stops at 0 and moving down stops at the last
//! item.

/// Move a cursor up one row.
pub fn cursor_up(cursor: usize) -> usize {
    cursor.saturating_sub(1)
}

/// Move a cursor down one row within a list of `count` items.
pub fn cursor_down(cursor: usize, count: usize) -> usize {
    if cursor + 1 < count {
        cursor + 1
    } else {
        cursor
    }
}

/// Re-bound a cursor after one item was removed from the list it points into.
pub fn clamp_after_delete(cursor: usize, count: usize) -> usize {
    if cursor >= count && cursor > 0 {
        cursor - 1
    } else {
        cursor
    }
}

/// Clamp a cursor into `[0, count - 1]`, or 0 for an empty list.
pub fn clamp_cursor(cursor: usize, count: usize) -> usize {
    cursor.min(count.saturating_sub(1))
}

/// Map a digit key to a zero-based position (`'1'` is the first item).
pub fn digit_position(c: char) -> Option<usize> {
    c.to_digit(10)
        .and_then(|d| (d as usize).checked_sub(1))
}

/// Shorten `s` to at most `width` characters, marking the cut with an ellipsis.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width).collect();
        out.push_str("...");
        out
    }
}
