//! Enumerations for TUI state management.

use crate::fields::TaskFilter;
use crate::task::TaskId;
use crate::tui::input::InputField;

/// Entries of the main menu, in display order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuEntry {
    AddTask,
    ListTasks,
    ViewNotes,
    CompletedToday,
    DueThisWeek,
    MarkDone,
    DeleteTask,
    Quit,
}

impl MenuEntry {
    pub const ALL: [MenuEntry; 8] = [
        MenuEntry::AddTask,
        MenuEntry::ListTasks,
        MenuEntry::ViewNotes,
        MenuEntry::CompletedToday,
        MenuEntry::DueThisWeek,
        MenuEntry::MarkDone,
        MenuEntry::DeleteTask,
        MenuEntry::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuEntry::AddTask => "Add Task",
            MenuEntry::ListTasks => "List All Tasks",
            MenuEntry::ViewNotes => "View Notes",
            MenuEntry::CompletedToday => "List Completed Tasks Today",
            MenuEntry::DueThisWeek => "List Tasks Due This Week",
            MenuEntry::MarkDone => "Mark Task as Done",
            MenuEntry::DeleteTask => "Delete Task",
            MenuEntry::Quit => "Quit",
        }
    }
}

/// The screen the controller is on, with the transient data that screen owns.
///
/// Tasks are referenced by id only; every screen re-resolves its task from the
/// repository before using it.
#[derive(Clone, Debug, PartialEq)]
pub enum Screen {
    Menu,
    AddDescription {
        input: InputField,
    },
    AddDueDate {
        description: String,
        input: InputField,
    },
    AskAddNote {
        task: TaskId,
    },
    AddNote {
        task: TaskId,
        input: InputField,
    },
    ListTasks {
        cursor: usize,
    },
    FilteredList {
        filter: TaskFilter,
        cursor: usize,
    },
    SelectTaskForNotes {
        cursor: usize,
    },
    ViewNotes {
        task: TaskId,
        note: usize,
    },
    EditNote {
        task: TaskId,
        index: usize,
        input: InputField,
    },
    MarkSelect {
        cursor: usize,
    },
    DeleteSelect {
        cursor: usize,
    },
    EditDescription {
        task: TaskId,
        back: Box<Screen>,
        input: InputField,
    },
    EditDueDate {
        task: TaskId,
        back: Box<Screen>,
        input: InputField,
    },
}

impl Screen {
    /// Heading shown in the header block.
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Menu => "Main Menu",
            Screen::AddDescription { .. } => "Add a new task (Description)",
            Screen::AddDueDate { .. } => "Add a new task (Due Date)",
            Screen::AskAddNote { .. } => "Add a note?",
            Screen::AddNote { .. } => "Add Note",
            Screen::ListTasks { .. } => "All Tasks",
            Screen::FilteredList { filter, .. } => filter.title(),
            Screen::SelectTaskForNotes { .. } => "Select Task for Notes",
            Screen::ViewNotes { .. } => "Notes",
            Screen::EditNote { .. } => "Edit Note",
            Screen::MarkSelect { .. } => "Mark Task as Done",
            Screen::DeleteSelect { .. } => "Delete Task",
            Screen::EditDescription { .. } => "Edit Description",
            Screen::EditDueDate { .. } => "Edit Due Date",
        }
    }

    /// Key help shown in the status bar when there is no message.
    pub fn hint(&self) -> &'static str {
        match self {
            Screen::Menu => "[↑/↓] Navigate • [Enter] Select • [q] Quit",
            Screen::AddDescription { .. } => "[Enter] Continue • [Esc] Cancel",
            Screen::AddDueDate { .. } | Screen::EditDueDate { .. } => {
                "YYYY-MM-DD, today, tomorrow, next week, friday, in 3d • [Enter] Save • [Esc] Cancel"
            }
            Screen::AskAddNote { .. } => "[y] Add a note • [n/Esc] Back to menu",
            Screen::AddNote { .. } | Screen::EditNote { .. } | Screen::EditDescription { .. } => {
                "[Enter] Save • [Esc] Cancel"
            }
            Screen::ListTasks { .. } | Screen::FilteredList { .. } => {
                "[↑/↓] Navigate • [d] Done • [i] In-Progress • [x] Delete • [r] Rename • [u] Due • [Enter] Notes • [Esc] Back"
            }
            Screen::SelectTaskForNotes { .. } => {
                "[↑/↓] Navigate • [#] Task Number • [Enter] Open Notes • [Esc] Back"
            }
            Screen::ViewNotes { .. } => {
                "[↑/↓] Navigate • [#] Note Number • [a] Add • [e] Edit • [x] Delete • [Esc] Back"
            }
            Screen::MarkSelect { .. } => "[↑/↓] Navigate • [Enter] Mark Done • [Esc] Back",
            Screen::DeleteSelect { .. } => "[↑/↓] Navigate • [Enter] Delete • [Esc] Back",
        }
    }

    /// The text input focused on this screen, if any.
    pub fn input(&self) -> Option<&InputField> {
        match self {
            Screen::AddDescription { input }
            | Screen::AddDueDate { input, .. }
            | Screen::AddNote { input, .. }
            | Screen::EditNote { input, .. }
            | Screen::EditDescription { input, .. }
            | Screen::EditDueDate { input, .. } => Some(input),
            _ => None,
        }
    }
}
