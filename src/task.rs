//! Task data structure and related functionality.
//!
//! This module defines the core `Task` struct: a single unit of work with its
//! description, status, timestamps and ordered notes.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fields::Status;

/// Stable task identifier, assigned once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        TaskId(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A tracked work item.
///
/// Records written without an `id` (older files) are given a fresh one on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: TaskId,
    pub description: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub notes: Vec<String>,
    pub due_date: DateTime<Local>,
    pub created_at: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Local>>,
    #[serde(default = "Local::now")]
    pub last_modified_at: DateTime<Local>,
}

impl Task {
    /// Build a pending task with no notes.
    pub fn new(description: &str, due_date: DateTime<Local>, now: DateTime<Local>) -> Self {
        Task {
            id: TaskId::new(),
            description: description.to_string(),
            status: Status::Pending,
            notes: Vec::new(),
            due_date,
            created_at: now,
            completed_at: None,
            last_modified_at: now,
        }
    }

    /// Move to `status`, stamping `completed_at` only when entering Done.
    pub fn set_status(&mut self, status: Status, now: DateTime<Local>) {
        if status == Status::Done && self.status != Status::Done {
            self.completed_at = Some(now);
        }
        self.status = status;
        self.last_modified_at = now;
    }

    pub fn is_done(&self) -> bool {
        self.status == Status::Done
    }
}
