//! Drawing the controller state onto a ratatui frame.
//!
//! Everything here reads from `App` and the repository; nothing is mutated.

use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::due::format_due_relative;
use crate::fields::{Status, TaskFilter};
use crate::task::{Task, TaskId};
use crate::tui::{
    app::App,
    colors::{style, Role},
    enums::{MenuEntry, Screen},
    input::InputField,
    utils::clamp_cursor,
};

const APP_TITLE: &str = "TASK TRACKER";
const HIGHLIGHT: &str = "► ";

/// Render the whole screen.
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    render_header(f, app.screen(), chunks[0]);
    render_body(f, app, chunks[1]);
    render_status_bar(f, app, chunks[2]);
}

fn render_header(f: &mut Frame, screen: &Screen, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(APP_TITLE, style(Role::Title)),
        Span::raw("  "),
        Span::styled(screen.title(), style(Role::Help)),
    ]))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    f.render_widget(header, area);
}

fn render_body(f: &mut Frame, app: &App, area: Rect) {
    match app.screen() {
        Screen::Menu => render_menu(f, app.menu_cursor(), area),
        Screen::AddDescription { input } => {
            render_input(f, area, &[], "Enter task description", input)
        }
        Screen::AddDueDate { description, input } => {
            let context = [Line::from(format!("Description: {description}"))];
            render_input(
                f,
                area,
                &context,
                "Due date (YYYY-MM-DD, today, tomorrow, next week; blank = in 2 days)",
                input,
            )
        }
        Screen::AskAddNote { task } => render_ask_note(f, app, *task, area),
        Screen::AddNote { task, input } => {
            let mut context = Vec::new();
            if let Some(t) = app.db().get(*task) {
                context.push(Line::from(format!("Adding note to: {}", t.description)));
                context.extend(numbered_notes(t, None));
            }
            render_input(f, area, &context, "New note", input)
        }
        Screen::ListTasks { cursor }
        | Screen::SelectTaskForNotes { cursor }
        | Screen::MarkSelect { cursor }
        | Screen::DeleteSelect { cursor } => render_task_table(f, app, None, *cursor, area),
        Screen::FilteredList { filter, cursor } => {
            render_task_table(f, app, Some(*filter), *cursor, area)
        }
        Screen::ViewNotes { task, note } => render_notes(f, app, *task, *note, area),
        Screen::EditNote { input, .. } => render_input(f, area, &[], "Edit note", input),
        Screen::EditDescription { input, .. } => {
            render_input(f, area, &[], "New description", input)
        }
        Screen::EditDueDate { input, .. } => render_input(f, area, &[], "New due date", input),
    }
}

fn render_menu(f: &mut Frame, cursor: usize, area: Rect) {
    let lines: Vec<Line> = MenuEntry::ALL
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let text = format!("{}. {}", i + 1, entry.label());
            if i == cursor {
                Line::from(Span::styled(format!("{HIGHLIGHT}{text}"), style(Role::Selected)))
            } else {
                Line::from(Span::styled(format!("  {text}"), style(Role::Normal)))
            }
        })
        .collect();

    let menu = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Main Menu "),
    );
    f.render_widget(menu, area);
}

/// Context lines above a bordered single-line input, with the terminal cursor inside it.
fn render_input(f: &mut Frame, area: Rect, context: &[Line], prompt: &str, input: &InputField) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    if !context.is_empty() {
        let above = Paragraph::new(context.to_vec()).wrap(Wrap { trim: false });
        f.render_widget(above, chunks[0]);
    }

    let input_area = chunks[1];
    let field = Paragraph::new(input.value.as_str())
        .style(style(Role::Input))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {prompt} ")),
        );
    f.render_widget(field, input_area);

    let max_x = input_area.x + input_area.width.saturating_sub(2);
    let x = (input_area.x + 1).saturating_add(input.cursor as u16).min(max_x);
    f.set_cursor_position((x, input_area.y + 1));
}

fn render_ask_note(f: &mut Frame, app: &App, task: TaskId, area: Rect) {
    let mut lines = Vec::new();
    if let Some(t) = app.db().get(task) {
        lines.push(Line::from(format!("Task: {}", t.description)));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "Would you like to add a note? (y/n)",
        style(Role::Title),
    )));
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn status_role(status: Status) -> Role {
    match status {
        Status::Pending => Role::StatusTodo,
        Status::InProgress => Role::StatusInProgress,
        Status::Done => Role::StatusDone,
    }
}

fn render_task_table(f: &mut Frame, app: &App, filter: Option<TaskFilter>, cursor: usize, area: Rect) {
    let now = Local::now();
    let tasks: Vec<&Task> = match filter {
        None => app.db().tasks().iter().collect(),
        Some(filter) => app.db().filtered(filter, now),
    };
    let title = match filter {
        Some(filter) => format!(" {} ", filter.title()),
        None => format!(" {} ", app.screen().title()),
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if tasks.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled("No tasks found.", style(Role::Help))).block(block),
            area,
        );
        return;
    }

    let today = now.date_naive();
    let rows = tasks.iter().enumerate().map(|(i, task)| {
        let due = format!(
            "{} ({})",
            task.due_date.format("%Y-%m-%d"),
            format_due_relative(task.due_date, today)
        );
        let row = Row::new(vec![
            Span::raw((i + 1).to_string()),
            Span::raw(task.description.clone()),
            Span::styled(due, style(Role::Due)),
            Span::styled(task.status.as_str(), style(status_role(task.status))),
            Span::raw(task.notes.len().to_string()),
        ]);
        if task.is_done() {
            row.style(style(Role::Done))
        } else {
            row.style(style(Role::Normal))
        }
    });

    let widths = [
        Constraint::Length(3),
        Constraint::Min(20),
        Constraint::Length(24),
        Constraint::Length(12),
        Constraint::Length(5),
    ];
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["#", "Description", "Due", "Status", "Notes"]).style(style(Role::Title)))
        .block(block)
        .row_highlight_style(style(Role::Selected))
        .highlight_symbol(HIGHLIGHT);

    let mut state = TableState::default().with_selected(Some(clamp_cursor(cursor, tasks.len())));
    f.render_stateful_widget(table, area, &mut state);
}

/// One line per note, numbered from 1, with `selected` highlighted.
fn numbered_notes(task: &Task, selected: Option<usize>) -> Vec<Line<'static>> {
    task.notes
        .iter()
        .enumerate()
        .map(|(i, note)| {
            let text = format!("{}. {}", i + 1, note);
            if Some(i) == selected {
                Line::from(Span::styled(format!("{HIGHLIGHT}{text}"), style(Role::Selected)))
            } else {
                Line::from(Span::styled(format!("  {text}"), style(Role::Normal)))
            }
        })
        .collect()
}

fn render_notes(f: &mut Frame, app: &App, task: TaskId, note: usize, area: Rect) {
    let Some(t) = app.db().get(task) else {
        f.render_widget(
            Paragraph::new("Task no longer exists.").block(Block::default().borders(Borders::ALL)),
            area,
        );
        return;
    };

    let lines = if t.notes.is_empty() {
        vec![Line::from(Span::styled(
            "No notes yet. Press 'a' to add.",
            style(Role::Help),
        ))]
    } else {
        numbered_notes(t, Some(clamp_cursor(note, t.notes.len())))
    };

    let notes = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Notes for {} ", t.description)),
        );
    f.render_widget(notes, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let (text, role) = if app.status_message().is_empty() {
        (app.screen().hint(), Role::StatusBar)
    } else if app.status_is_error() {
        (app.status_message(), Role::Error)
    } else {
        (app.status_message(), Role::StatusBar)
    };
    f.render_widget(Paragraph::new(text).style(style(role)), area);
}
