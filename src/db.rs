//! In-memory task repository backed by a `Storage`.
//!
//! `Database` is the sole writer of the task collection. Every mutating
//! operation edits the in-memory list and then saves the complete collection.
//! Save failures never abort the session: they are logged and kept for the
//! interface to report, and the next mutation simply tries again.

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::fields::{Status, TaskFilter};
use crate::storage::{Storage, StorageError};
use crate::task::{Task, TaskId};

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("{0}")]
    InvalidInput(&'static str),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Ordered task collection plus the storage it is persisted to.
pub struct Database {
    tasks: Vec<Task>,
    storage: Box<dyn Storage>,
    save_error: Option<StorageError>,
}

impl Database {
    /// Open the repository, loading whatever the storage holds.
    ///
    /// An unreadable store is not fatal: the repository starts empty, a copy
    /// of the bad file is kept aside, and the load error is handed back so the
    /// caller can show it.
    pub fn open(storage: Box<dyn Storage>) -> (Self, Option<TaskError>) {
        match storage.load() {
            Ok(tasks) => {
                info!(count = tasks.len(), "tasks loaded");
                (Database::with_tasks(tasks, storage), None)
            }
            Err(e) => {
                error!(error = %e, "could not load tasks, starting empty");
                if let Err(backup) = storage.preserve_unreadable() {
                    warn!(error = %backup, "could not keep a copy of the unreadable store");
                }
                (Database::with_tasks(Vec::new(), storage), Some(e.into()))
            }
        }
    }

    fn with_tasks(tasks: Vec<Task>, storage: Box<dyn Storage>) -> Self {
        Database {
            tasks,
            storage,
            save_error: None,
        }
    }

    /// All tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Get a task by ID.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Take the most recent save failure, if the last save failed.
    pub fn take_save_error(&mut self) -> Option<StorageError> {
        self.save_error.take()
    }

    fn persist(&mut self) {
        match self.storage.save_all(&self.tasks) {
            Ok(()) => self.save_error = None,
            Err(e) => {
                error!(error = %e, "saving tasks failed, keeping in-memory state");
                self.save_error = Some(e);
            }
        }
    }

    /// Create a pending task. Blank descriptions are rejected without saving.
    pub fn add_task(&mut self, description: &str, due: DateTime<Local>) -> Result<Task, TaskError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(TaskError::InvalidInput("Task description cannot be empty"));
        }
        let task = Task::new(description, due, Local::now());
        info!(id = %task.id, "task added");
        self.tasks.push(task.clone());
        self.persist();
        Ok(task)
    }

    /// Mark a task done. Repeating it leaves the first completion time alone.
    pub fn mark_done(&mut self, id: TaskId) {
        self.set_status(id, Status::Done);
    }

    /// Generic status transition; `completed_at` is only touched on entering Done.
    pub fn set_status(&mut self, id: TaskId, status: Status) {
        let now = Local::now();
        if let Some(task) = self.get_mut(id) {
            task.set_status(status, now);
            info!(%id, status = status.as_str(), "task status changed");
        }
        self.persist();
    }

    /// Flip between in-progress and pending. Any other status becomes in-progress.
    pub fn toggle_in_progress(&mut self, id: TaskId) {
        let next = match self.get(id).map(|t| t.status) {
            Some(Status::InProgress) => Status::Pending,
            _ => Status::InProgress,
        };
        self.set_status(id, next);
    }

    pub fn update_description(&mut self, id: TaskId, text: &str) -> Result<(), TaskError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TaskError::InvalidInput("Task description cannot be empty"));
        }
        let now = Local::now();
        if let Some(task) = self.get_mut(id) {
            task.description = text.to_string();
            task.last_modified_at = now;
        }
        self.persist();
        Ok(())
    }

    pub fn update_due_date(&mut self, id: TaskId, due: DateTime<Local>) {
        let now = Local::now();
        if let Some(task) = self.get_mut(id) {
            task.due_date = due;
            task.last_modified_at = now;
        }
        self.persist();
    }

    /// Append a note to a task.
    pub fn add_note(&mut self, id: TaskId, text: &str) {
        let now = Local::now();
        if let Some(task) = self.get_mut(id) {
            task.notes.push(text.to_string());
            task.last_modified_at = now;
        }
        self.persist();
    }

    /// Remove the note at `index`; out-of-range indices change nothing.
    pub fn delete_note_at(&mut self, id: TaskId, index: usize) {
        let now = Local::now();
        if let Some(task) = self.get_mut(id) {
            if index < task.notes.len() {
                task.notes.remove(index);
                task.last_modified_at = now;
            }
        }
        self.persist();
    }

    /// Replace the note at `index`; out-of-range indices change nothing.
    pub fn update_note_at(&mut self, id: TaskId, index: usize, text: &str) {
        let now = Local::now();
        if let Some(task) = self.get_mut(id) {
            if let Some(note) = task.notes.get_mut(index) {
                *note = text.to_string();
                task.last_modified_at = now;
            }
        }
        self.persist();
    }

    /// Remove one task, keeping the order of the rest.
    pub fn delete_task(&mut self, id: TaskId) {
        if let Some(pos) = self.tasks.iter().position(|t| t.id == id) {
            self.tasks.remove(pos);
            info!(%id, "task deleted");
        }
        self.persist();
    }

    /// Tasks matching `predicate`, in insertion order.
    pub fn filter<P>(&self, predicate: P) -> Vec<&Task>
    where
        P: Fn(&Task) -> bool,
    {
        self.tasks.iter().filter(|t| predicate(t)).collect()
    }

    /// Tasks in one of the derived views, relative to `now`.
    pub fn filtered(&self, filter: TaskFilter, now: DateTime<Local>) -> Vec<&Task> {
        self.filter(|t| filter.matches(t, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io;
    use std::path::PathBuf;
    use std::rc::Rc;

    use chrono::Duration;
    use tempfile::TempDir;

    use crate::storage::JsonFileStorage;

    fn open_in(dir: &TempDir) -> Database {
        let storage = JsonFileStorage::new(dir.path().join("tasks.json"));
        let (db, err) = Database::open(Box::new(storage));
        assert!(err.is_none());
        db
    }

    fn reload(dir: &TempDir) -> Database {
        open_in(dir)
    }

    fn tomorrow() -> DateTime<Local> {
        Local::now() + Duration::days(1)
    }

    /// Storage whose saves can be switched to fail.
    struct FlakyStorage {
        fail: Rc<Cell<bool>>,
        saves: Rc<Cell<usize>>,
    }

    impl Storage for FlakyStorage {
        fn load(&self) -> Result<Vec<Task>, StorageError> {
            Ok(Vec::new())
        }

        fn save_all(&self, _tasks: &[Task]) -> Result<(), StorageError> {
            self.saves.set(self.saves.get() + 1);
            if self.fail.get() {
                Err(StorageError::WriteFailed {
                    path: PathBuf::from("tasks.json"),
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
                })
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_only_non_empty_descriptions_are_added() {
        let dir = TempDir::new().unwrap();
        let mut db = open_in(&dir);
        let inputs = ["Buy milk", "", "   ", "Call mum", "\t", "Pay rent"];
        let mut accepted = 0;
        for input in inputs {
            match db.add_task(input, tomorrow()) {
                Ok(_) => accepted += 1,
                Err(e) => assert!(matches!(e, TaskError::InvalidInput(_))),
            }
        }
        assert_eq!(accepted, 3);
        assert_eq!(db.len(), 3);
        assert_eq!(reload(&dir).len(), 3);
    }

    #[test]
    fn test_add_task_defaults() {
        let dir = TempDir::new().unwrap();
        let mut db = open_in(&dir);
        let task = db.add_task("  Buy milk ", tomorrow()).unwrap();
        assert_eq!(task.description, "Buy milk");
        assert_eq!(task.status, Status::Pending);
        assert!(task.notes.is_empty());
        assert!(task.completed_at.is_none());
        assert_eq!(db.get(task.id), Some(&task));
    }

    #[test]
    fn test_ids_are_unique() {
        let dir = TempDir::new().unwrap();
        let mut db = open_in(&dir);
        let a = db.add_task("A", tomorrow()).unwrap();
        let b = db.add_task("A", tomorrow()).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_mark_done_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut db = open_in(&dir);
        let task = db.add_task("Buy milk", tomorrow()).unwrap();

        db.mark_done(task.id);
        let first = db.get(task.id).unwrap().completed_at;
        assert!(first.is_some());

        db.mark_done(task.id);
        let again = db.get(task.id).unwrap();
        assert_eq!(again.status, Status::Done);
        assert_eq!(again.completed_at, first);
    }

    #[test]
    fn test_mark_done_unknown_id_still_persists() {
        let fail = Rc::new(Cell::new(false));
        let saves = Rc::new(Cell::new(0));
        let storage = FlakyStorage { fail: fail.clone(), saves: saves.clone() };
        let (mut db, _) = Database::open(Box::new(storage));
        db.mark_done(TaskId::new());
        assert_eq!(saves.get(), 1);
        assert!(db.is_empty());
    }

    #[test]
    fn test_toggle_in_progress() {
        let dir = TempDir::new().unwrap();
        let mut db = open_in(&dir);
        let id = db.add_task("Paint fence", tomorrow()).unwrap().id;

        db.toggle_in_progress(id);
        assert_eq!(db.get(id).unwrap().status, Status::InProgress);
        db.toggle_in_progress(id);
        assert_eq!(db.get(id).unwrap().status, Status::Pending);

        db.mark_done(id);
        db.toggle_in_progress(id);
        let task = db.get(id).unwrap();
        assert_eq!(task.status, Status::InProgress);
        assert!(task.completed_at.is_some());
    }

    #[test]
    fn test_delete_task_preserves_order() {
        let dir = TempDir::new().unwrap();
        let mut db = open_in(&dir);
        let ids: Vec<TaskId> = ["A", "B", "C", "D"]
            .iter()
            .map(|d| db.add_task(d, tomorrow()).unwrap().id)
            .collect();

        db.delete_task(ids[1]);
        let left: Vec<&str> = db.tasks().iter().map(|t| t.description.as_str()).collect();
        assert_eq!(left, ["A", "C", "D"]);

        db.delete_task(TaskId::new());
        assert_eq!(db.len(), 3);
        assert_eq!(reload(&dir).len(), 3);
    }

    #[test]
    fn test_delete_then_lookup_is_not_found() {
        let dir = TempDir::new().unwrap();
        let mut db = open_in(&dir);
        let a = db.add_task("A", tomorrow()).unwrap();
        let b = db.add_task("B", tomorrow()).unwrap();

        db.delete_task(a.id);
        assert!(db.get(a.id).is_none());
        assert_eq!(db.len(), 1);
        assert_eq!(db.tasks()[0].id, b.id);
        assert_eq!(db.tasks()[0].description, "B");
    }

    #[test]
    fn test_note_operations_ignore_out_of_range_indices() {
        let dir = TempDir::new().unwrap();
        let mut db = open_in(&dir);
        let id = db.add_task("Plan trip", tomorrow()).unwrap().id;
        db.add_note(id, "book hotel");
        db.add_note(id, "book hotel");
        db.add_note(id, "pack");

        db.delete_note_at(id, 3);
        db.delete_note_at(id, usize::MAX);
        db.update_note_at(id, 7, "ignored");
        assert_eq!(db.get(id).unwrap().notes, ["book hotel", "book hotel", "pack"]);

        db.update_note_at(id, 1, "book flights");
        db.delete_note_at(id, 0);
        assert_eq!(db.get(id).unwrap().notes, ["book flights", "pack"]);
        assert_eq!(reload(&dir).get(id).unwrap().notes, ["book flights", "pack"]);
    }

    #[test]
    fn test_notes_on_missing_task_are_noops() {
        let dir = TempDir::new().unwrap();
        let mut db = open_in(&dir);
        db.add_task("Plan trip", tomorrow()).unwrap();
        let ghost = TaskId::new();
        db.add_note(ghost, "x");
        db.update_note_at(ghost, 0, "x");
        db.delete_note_at(ghost, 0);
        assert!(db.tasks()[0].notes.is_empty());
    }

    #[test]
    fn test_update_description_and_due_date() {
        let dir = TempDir::new().unwrap();
        let mut db = open_in(&dir);
        let task = db.add_task("Draft", tomorrow()).unwrap();
        let due = Local::now() + Duration::days(10);

        assert!(db.update_description(task.id, "  ").is_err());
        db.update_description(task.id, "Final draft").unwrap();
        db.update_due_date(task.id, due);

        let updated = reload(&dir).get(task.id).cloned().unwrap();
        assert_eq!(updated.description, "Final draft");
        assert_eq!(updated.due_date, due);
        assert!(updated.last_modified_at >= task.last_modified_at);
    }

    #[test]
    fn test_completed_today_scenario() {
        let dir = TempDir::new().unwrap();
        let mut db = open_in(&dir);
        let task = db.add_task("Buy milk", tomorrow()).unwrap();
        db.add_task("Walk dog", tomorrow()).unwrap();
        db.mark_done(task.id);

        let done = db.filtered(TaskFilter::CompletedToday, Local::now());
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].description, "Buy milk");
    }

    #[test]
    fn test_save_failure_is_reported_not_fatal() {
        let fail = Rc::new(Cell::new(true));
        let saves = Rc::new(Cell::new(0));
        let storage = FlakyStorage { fail: fail.clone(), saves: saves.clone() };
        let (mut db, _) = Database::open(Box::new(storage));

        let task = db.add_task("Buy milk", tomorrow()).unwrap();
        assert!(matches!(db.take_save_error(), Some(StorageError::WriteFailed { .. })));
        assert!(db.take_save_error().is_none());
        assert_eq!(db.get(task.id).unwrap().description, "Buy milk");

        fail.set(false);
        db.add_note(task.id, "semi-skimmed");
        assert!(db.take_save_error().is_none());
        assert_eq!(saves.get(), 2);
    }

    #[test]
    fn test_malformed_store_opens_empty_with_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, "[{\"description\": 42}]").unwrap();

        let (db, err) = Database::open(Box::new(JsonFileStorage::new(path.clone())));
        assert!(db.is_empty());
        assert!(matches!(err, Some(TaskError::Storage(StorageError::ParseFailed { .. }))));
        assert!(path.with_extension("json.corrupt").exists());
    }
}
