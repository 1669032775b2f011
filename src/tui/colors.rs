//! Styles for the terminal user interface.
//!
//! Rendering asks for a semantic role and gets a style back; nothing here
//! holds state.

use ratatui::style::{Color, Modifier, Style};

/// Used for the highlighted row and "todo" status.
pub const BRIGHT_GREEN: Color = Color::Rgb(80, 250, 123);
/// Used for "in-progress" status.
pub const BRIGHT_BLUE: Color = Color::Rgb(98, 160, 255);
/// Used for due dates.
pub const AMBER: Color = Color::Rgb(255, 200, 60);
/// Status bar background.
pub const SLATE: Color = Color::Rgb(40, 52, 72);

/// What a piece of text means, independent of how it looks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Title,
    Selected,
    Normal,
    Done,
    Help,
    StatusTodo,
    StatusInProgress,
    StatusDone,
    Due,
    Input,
    StatusBar,
    Error,
}

/// Style for a semantic role.
pub fn style(role: Role) -> Style {
    match role {
        Role::Title => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        Role::Selected => Style::default().fg(BRIGHT_GREEN).add_modifier(Modifier::BOLD),
        Role::Normal => Style::default().fg(Color::Gray),
        Role::Done => Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT),
        Role::Help => Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        Role::StatusTodo => Style::default().fg(BRIGHT_GREEN).add_modifier(Modifier::BOLD),
        Role::StatusInProgress => Style::default().fg(BRIGHT_BLUE).add_modifier(Modifier::BOLD),
        Role::StatusDone => Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT),
        Role::Due => Style::default().fg(AMBER),
        Role::Input => Style::default().fg(Color::Yellow),
        Role::StatusBar => Style::default().bg(SLATE).fg(Color::White),
        Role::Error => Style::default().bg(Color::Red).fg(Color::White),
    }
}
