//! Main application logic for the terminal user interface.
//!
//! `App` is the controller state machine. Each key event is dispatched on the
//! current `Screen`, may call into the `Database`, and yields the next screen.
//! Screens only hold task ids, so after any mutation the selected task and note
//! are looked up again instead of trusting a stale copy.

use std::io;
use std::mem;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, Terminal};
use tracing::debug;

use crate::db::{Database, TaskError};
use crate::due::parse_due_date;
use crate::fields::TaskFilter;
use crate::task::TaskId;
use crate::tui::{
    enums::{MenuEntry, Screen},
    input::InputField,
    render,
    utils::{clamp_after_delete, clamp_cursor, cursor_down, cursor_up, digit_position, truncate},
};

/// Longest note prefix echoed back after adding a note.
const NOTE_ECHO_CHARS: usize = 20;

/// Main application state for the terminal user interface.
pub struct App {
    screen: Screen,
    db: Database,
    menu_cursor: usize,
    status_message: String,
    status_is_error: bool,
    should_quit: bool,
}

impl App {
    /// Create the controller on the main menu.
    pub fn new(db: Database) -> Self {
        App {
            screen: Screen::Menu,
            db,
            menu_cursor: 0,
            status_message: String::new(),
            status_is_error: false,
            should_quit: false,
        }
    }

    /// Create the controller, surfacing a problem from opening the store.
    pub fn with_startup_error(db: Database, error: Option<TaskError>) -> Self {
        let mut app = App::new(db);
        if let Some(e) = error {
            app.set_error_message(format!("Could not load tasks, starting empty: {e}"));
        }
        app
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn menu_cursor(&self) -> usize {
        self.menu_cursor
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn status_is_error(&self) -> bool {
        self.status_is_error
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
        self.status_is_error = false;
    }

    fn set_error_message(&mut self, msg: String) {
        self.status_message = msg;
        self.status_is_error = true;
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
        self.status_is_error = false;
    }

    /// Ids of the tasks shown by a list screen, in display order.
    pub fn list_ids(&self, filter: Option<TaskFilter>) -> Vec<TaskId> {
        match filter {
            None => self.db.tasks().iter().map(|t| t.id).collect(),
            Some(filter) => self
                .db
                .filtered(filter, Local::now())
                .into_iter()
                .map(|t| t.id)
                .collect(),
        }
    }

    /// Process one key press. Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.clear_status_message();

        let before = mem::discriminant(&self.screen);
        let screen = mem::replace(&mut self.screen, Screen::Menu);
        let next = match screen {
            Screen::Menu => self.handle_menu_input(key),
            Screen::AddDescription { input } => self.handle_add_description_input(key, input),
            Screen::AddDueDate { description, input } => {
                self.handle_add_due_input(key, description, input)
            }
            Screen::AskAddNote { task } => self.handle_ask_note_input(key, task),
            Screen::AddNote { task, input } => self.handle_add_note_input(key, task, input),
            Screen::ListTasks { cursor } => self.handle_task_list_input(key, None, cursor),
            Screen::FilteredList { filter, cursor } => {
                self.handle_task_list_input(key, Some(filter), cursor)
            }
            Screen::SelectTaskForNotes { cursor } => self.handle_select_for_notes_input(key, cursor),
            Screen::ViewNotes { task, note } => self.handle_view_notes_input(key, task, note),
            Screen::EditNote { task, index, input } => {
                self.handle_edit_note_input(key, task, index, input)
            }
            Screen::MarkSelect { cursor } => self.handle_pick_input(key, cursor, false),
            Screen::DeleteSelect { cursor } => self.handle_pick_input(key, cursor, true),
            Screen::EditDescription { task, back, input } => {
                self.handle_edit_description_input(key, task, back, input)
            }
            Screen::EditDueDate { task, back, input } => {
                self.handle_edit_due_input(key, task, back, input)
            }
        };

        if mem::discriminant(&next) != before {
            debug!(screen = next.title(), "screen changed");
        }
        self.screen = next;

        if let Some(e) = self.db.take_save_error() {
            self.set_error_message(format!("Error saving: {e}"));
        }
        self.should_quit
    }

    /// Handle input for the main menu.
    fn handle_menu_input(&mut self, key: KeyEvent) -> Screen {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up => self.menu_cursor = cursor_up(self.menu_cursor),
            KeyCode::Down => self.menu_cursor = cursor_down(self.menu_cursor, MenuEntry::ALL.len()),
            KeyCode::Enter => {
                return match MenuEntry::ALL[clamp_cursor(self.menu_cursor, MenuEntry::ALL.len())] {
                    MenuEntry::AddTask => Screen::AddDescription { input: InputField::new() },
                    MenuEntry::ListTasks => Screen::ListTasks { cursor: 0 },
                    MenuEntry::ViewNotes => Screen::SelectTaskForNotes { cursor: 0 },
                    MenuEntry::CompletedToday => Screen::FilteredList {
                        filter: TaskFilter::CompletedToday,
                        cursor: 0,
                    },
                    MenuEntry::DueThisWeek => Screen::FilteredList {
                        filter: TaskFilter::DueThisWeek,
                        cursor: 0,
                    },
                    MenuEntry::MarkDone => Screen::MarkSelect { cursor: 0 },
                    MenuEntry::DeleteTask => Screen::DeleteSelect { cursor: 0 },
                    MenuEntry::Quit => {
                        self.should_quit = true;
                        Screen::Menu
                    }
                };
            }
            _ => {}
        }
        Screen::Menu
    }

    fn handle_add_description_input(&mut self, key: KeyEvent, mut input: InputField) -> Screen {
        match key.code {
            KeyCode::Esc => Screen::Menu,
            KeyCode::Enter => {
                if input.trimmed().is_empty() {
                    Screen::Menu
                } else {
                    Screen::AddDueDate {
                        description: input.trimmed().to_string(),
                        input: InputField::new(),
                    }
                }
            }
            _ => {
                edit_input(&mut input, key);
                Screen::AddDescription { input }
            }
        }
    }

    /// The task is only created once the due date is confirmed; Esc creates nothing.
    fn handle_add_due_input(&mut self, key: KeyEvent, description: String, mut input: InputField) -> Screen {
        match key.code {
            KeyCode::Esc => Screen::Menu,
            KeyCode::Enter => {
                let due = parse_due_date(&input.value, Local::now());
                match self.db.add_task(&description, due) {
                    Ok(task) => {
                        self.set_status_message(format!("Task created: {}", task.description));
                        Screen::AskAddNote { task: task.id }
                    }
                    Err(e) => {
                        self.set_error_message(e.to_string());
                        Screen::AddDescription {
                            input: InputField::with_value(&description),
                        }
                    }
                }
            }
            _ => {
                edit_input(&mut input, key);
                Screen::AddDueDate { description, input }
            }
        }
    }

    fn handle_ask_note_input(&mut self, key: KeyEvent, task: TaskId) -> Screen {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Screen::AddNote {
                task,
                input: InputField::new(),
            },
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Screen::Menu,
            _ => Screen::AskAddNote { task },
        }
    }

    /// Notes screen for `task` if it still exists, otherwise the menu.
    fn notes_or_menu(&mut self, task: TaskId, note: usize) -> Screen {
        if self.db.get(task).is_some() {
            Screen::ViewNotes { task, note }
        } else {
            self.set_error_message("Task no longer exists".to_string());
            Screen::Menu
        }
    }

    fn handle_add_note_input(&mut self, key: KeyEvent, task: TaskId, mut input: InputField) -> Screen {
        match key.code {
            KeyCode::Esc => self.notes_or_menu(task, 0),
            KeyCode::Enter => {
                let text = input.trimmed().to_string();
                if text.is_empty() {
                    return Screen::AddNote { task, input };
                }
                if self.db.get(task).is_none() {
                    return self.notes_or_menu(task, 0);
                }
                self.db.add_note(task, &text);
                self.set_status_message(format!("Note added: {}", truncate(&text, NOTE_ECHO_CHARS)));
                Screen::AddNote {
                    task,
                    input: InputField::new(),
                }
            }
            _ => {
                edit_input(&mut input, key);
                Screen::AddNote { task, input }
            }
        }
    }

    /// Shared handling for the full list and the filtered views.
    fn handle_task_list_input(&mut self, key: KeyEvent, filter: Option<TaskFilter>, cursor: usize) -> Screen {
        let ids = self.list_ids(filter);
        let mut cursor = clamp_cursor(cursor, ids.len());
        let selected = ids.get(cursor).copied();
        let here = |cursor| match filter {
            None => Screen::ListTasks { cursor },
            Some(filter) => Screen::FilteredList { filter, cursor },
        };

        match key.code {
            KeyCode::Esc => return Screen::Menu,
            KeyCode::Up => cursor = cursor_up(cursor),
            KeyCode::Down => cursor = cursor_down(cursor, ids.len()),
            KeyCode::Enter => {
                if let Some(task) = selected {
                    return Screen::ViewNotes { task, note: 0 };
                }
            }
            KeyCode::Char('d') => {
                if let Some(task) = selected {
                    self.db.mark_done(task);
                    self.set_status_message("Task marked as done".to_string());
                }
            }
            KeyCode::Char('i') => {
                if let Some(task) = selected {
                    self.db.toggle_in_progress(task);
                    if let Some(t) = self.db.get(task) {
                        let msg = format!("Task status updated to {}", t.status.as_str());
                        self.set_status_message(msg);
                    }
                }
            }
            KeyCode::Char('x') => {
                if let Some(task) = selected {
                    self.db.delete_task(task);
                    cursor = clamp_after_delete(cursor, self.list_ids(filter).len());
                    self.set_status_message("Task deleted".to_string());
                }
            }
            KeyCode::Char('r') => {
                if let Some(t) = selected.and_then(|id| self.db.get(id)) {
                    return Screen::EditDescription {
                        task: t.id,
                        input: InputField::with_value(&t.description),
                        back: Box::new(here(cursor)),
                    };
                }
            }
            KeyCode::Char('u') => {
                if let Some(t) = selected.and_then(|id| self.db.get(id)) {
                    let current = t.due_date.format("%Y-%m-%d").to_string();
                    return Screen::EditDueDate {
                        task: t.id,
                        input: InputField::with_value(&current),
                        back: Box::new(here(cursor)),
                    };
                }
            }
            _ => {}
        }
        // Marking or toggling can move a task out of a filtered view.
        here(clamp_cursor(cursor, self.list_ids(filter).len()))
    }

    fn handle_select_for_notes_input(&mut self, key: KeyEvent, cursor: usize) -> Screen {
        let ids = self.list_ids(None);
        let cursor = clamp_cursor(cursor, ids.len());
        match key.code {
            KeyCode::Esc => Screen::Menu,
            KeyCode::Up => Screen::SelectTaskForNotes { cursor: cursor_up(cursor) },
            KeyCode::Down => Screen::SelectTaskForNotes {
                cursor: cursor_down(cursor, ids.len()),
            },
            KeyCode::Enter => match ids.get(cursor) {
                Some(&task) => Screen::ViewNotes { task, note: 0 },
                None => Screen::SelectTaskForNotes { cursor },
            },
            KeyCode::Char(c) => match digit_position(c).and_then(|i| ids.get(i)) {
                Some(&task) => Screen::ViewNotes { task, note: 0 },
                None => Screen::SelectTaskForNotes { cursor },
            },
            _ => Screen::SelectTaskForNotes { cursor },
        }
    }

    fn handle_view_notes_input(&mut self, key: KeyEvent, task: TaskId, note: usize) -> Screen {
        let Some(count) = self.db.get(task).map(|t| t.notes.len()) else {
            self.set_error_message("Task no longer exists".to_string());
            return Screen::Menu;
        };
        let mut note = clamp_cursor(note, count);

        match key.code {
            KeyCode::Esc => return Screen::ListTasks { cursor: 0 },
            KeyCode::Char('a') => {
                return Screen::AddNote {
                    task,
                    input: InputField::new(),
                }
            }
            KeyCode::Char('e') => {
                if let Some(text) = self.db.get(task).and_then(|t| t.notes.get(note)) {
                    return Screen::EditNote {
                        task,
                        index: note,
                        input: InputField::with_value(text),
                    };
                }
            }
            KeyCode::Char('x') => {
                if note < count {
                    self.db.delete_note_at(task, note);
                    let remaining = self.db.get(task).map_or(0, |t| t.notes.len());
                    note = clamp_after_delete(note, remaining);
                    self.set_status_message("Note deleted".to_string());
                }
            }
            KeyCode::Up => note = cursor_up(note),
            KeyCode::Down => note = cursor_down(note, count),
            KeyCode::Char(c) => {
                if let Some(i) = digit_position(c).filter(|&i| i < count) {
                    note = i;
                }
            }
            _ => {}
        }
        Screen::ViewNotes { task, note }
    }

    fn handle_edit_note_input(&mut self, key: KeyEvent, task: TaskId, index: usize, mut input: InputField) -> Screen {
        match key.code {
            KeyCode::Esc => self.notes_or_menu(task, index),
            KeyCode::Enter => {
                let text = input.trimmed().to_string();
                if text.is_empty() {
                    return Screen::EditNote { task, index, input };
                }
                self.db.update_note_at(task, index, &text);
                self.set_status_message("Note updated".to_string());
                self.notes_or_menu(task, index)
            }
            _ => {
                edit_input(&mut input, key);
                Screen::EditNote { task, index, input }
            }
        }
    }

    /// Mark-done and delete pickers over the full task list.
    fn handle_pick_input(&mut self, key: KeyEvent, cursor: usize, delete: bool) -> Screen {
        let ids = self.list_ids(None);
        let mut cursor = clamp_cursor(cursor, ids.len());
        match key.code {
            KeyCode::Esc => return Screen::Menu,
            KeyCode::Up => cursor = cursor_up(cursor),
            KeyCode::Down => cursor = cursor_down(cursor, ids.len()),
            KeyCode::Enter => {
                if let Some(&task) = ids.get(cursor) {
                    if delete {
                        self.db.delete_task(task);
                        cursor = clamp_after_delete(cursor, self.db.len());
                        self.set_status_message("Task deleted".to_string());
                    } else {
                        self.db.mark_done(task);
                        self.set_status_message("Task marked as done".to_string());
                    }
                }
            }
            _ => {}
        }
        if delete {
            Screen::DeleteSelect { cursor }
        } else {
            Screen::MarkSelect { cursor }
        }
    }

    fn handle_edit_description_input(
        &mut self,
        key: KeyEvent,
        task: TaskId,
        back: Box<Screen>,
        mut input: InputField,
    ) -> Screen {
        match key.code {
            KeyCode::Esc => *back,
            KeyCode::Enter => match self.db.update_description(task, &input.value) {
                Ok(()) => {
                    self.set_status_message("Description updated".to_string());
                    *back
                }
                Err(e) => {
                    self.set_error_message(e.to_string());
                    Screen::EditDescription { task, back, input }
                }
            },
            _ => {
                edit_input(&mut input, key);
                Screen::EditDescription { task, back, input }
            }
        }
    }

    fn handle_edit_due_input(
        &mut self,
        key: KeyEvent,
        task: TaskId,
        back: Box<Screen>,
        mut input: InputField,
    ) -> Screen {
        match key.code {
            KeyCode::Esc => *back,
            KeyCode::Enter => {
                let due = parse_due_date(&input.value, Local::now());
                self.db.update_due_date(task, due);
                self.set_status_message(format!("Due date set to {}", due.format("%Y-%m-%d")));
                *back
            }
            _ => {
                edit_input(&mut input, key);
                Screen::EditDueDate { task, back, input }
            }
        }
    }

    /// Poll for and handle a keyboard event.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key));
                }
            }
        }
        Ok(false)
    }

    /// Main event loop: draw, then process one event, until the user quits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| render::draw(f, self))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

/// Apply a text-editing key to `input`. Control chords are ignored.
fn edit_input(input: &mut InputField, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => input.handle_char(c),
        KeyCode::Backspace => input.handle_backspace(),
        KeyCode::Delete => input.handle_delete(),
        KeyCode::Left => input.move_cursor_left(),
        KeyCode::Right => input.move_cursor_right(),
        KeyCode::Home => input.move_cursor_home(),
        KeyCode::End => input.move_cursor_end(),
        _ => {}
    }
}
