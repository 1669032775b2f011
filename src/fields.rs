//! Enumerations and field types for task tracking.
//!
//! This module defines the structured values attached to tasks and the
//! derived-view filters used by the list screens.

use chrono::{DateTime, Datelike, Local};
use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Task progress status.
///
/// Stored on disk as `"todo"`, `"in-progress"` or `"done"`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Status {
    #[default]
    #[serde(rename = "todo", alias = "pending")]
    Pending,
    #[serde(rename = "in-progress", alias = "in_progress")]
    InProgress,
    #[serde(rename = "done")]
    Done,
}

impl Status {
    /// The short label used both on disk and in task tables.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "todo",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }
}

/// Derived views over the task collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilter {
    CompletedToday,
    DueThisWeek,
}

impl TaskFilter {
    /// Title shown above the filtered table.
    pub fn title(self) -> &'static str {
        match self {
            TaskFilter::CompletedToday => "Completed Tasks Today",
            TaskFilter::DueThisWeek => "Tasks Due This Week",
        }
    }

    /// Check whether `task` belongs to this view relative to `now`.
    ///
    /// "Due this week" compares ISO weeks rather than a rolling window, so a
    /// task due next Monday is excluded even when it is only a day away.
    pub fn matches(self, task: &Task, now: DateTime<Local>) -> bool {
        match self {
            TaskFilter::CompletedToday => {
                task.status == Status::Done
                    && task
                        .completed_at
                        .is_some_and(|done| done.date_naive() == now.date_naive())
            }
            TaskFilter::DueThisWeek => task.due_date.iso_week() == now.iso_week(),
        }
    }
}
