//! Terminal setup and teardown around the controller loop.

use std::io;
use std::panic;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};

use crate::db::{Database, TaskError};
use crate::tui::app::App;

/// Leave raw mode and the alternate screen. Safe to call when neither is active.
pub fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)
}

/// Restore the terminal before the panic message is printed, so it lands on
/// a usable shell.
fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        previous(info);
    }));
}

/// Initialise the terminal and run the task tracker until the user quits.
///
/// The terminal is restored on every exit path, including a panic.
pub fn run_tui(db: Database, startup_error: Option<TaskError>) -> io::Result<()> {
    install_panic_hook();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = restore_terminal();
        return Err(e);
    }
    let mut terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
        Ok(terminal) => terminal,
        Err(e) => {
            let _ = restore_terminal();
            return Err(e);
        }
    };

    let mut app = App::with_startup_error(db, startup_error);
    let result = app.run(&mut terminal);

    let restored = restore_terminal();
    let cursor = terminal.show_cursor();

    result.and(restored).and(cursor)
}
