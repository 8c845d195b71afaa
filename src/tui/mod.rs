pub mod app;
pub mod ui;

use std::{error::Error, io, time::{Duration, Instant}};
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{error, info};
use crate::storage::Storage;
use crate::store::TaskStore;
use app::{App, InputMode};
use ui::ui;

pub fn run_tui<S: Storage>(store: TaskStore<S>, tick_rate: Duration) -> Result<(), Box<dyn Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store, Local::now().naive_local());
    info!(tasks = app.store.tasks().len(), "interactive view started");

    let res = run_app(&mut terminal, &mut app, tick_rate);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %err, "interactive view failed");
        println!("{:?}", err)
    }

    Ok(())
}

fn run_app<B: Backend, S: Storage>(terminal: &mut Terminal<B>, app: &mut App<S>, tick_rate: Duration) -> io::Result<()> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key(app, key.code) {
                    return Ok(());
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick(Local::now().naive_local());
            last_tick = Instant::now();
        }
    }
}

/// Applies one key press. Returns `true` when the user asked to quit.
fn handle_key<S: Storage>(app: &mut App<S>, code: KeyCode) -> bool {
    let now = Local::now().naive_local();
    match app.input_mode {
        InputMode::Normal => {
            app.message = None;
            match code {
                KeyCode::Char('q') => return true,
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Char(' ') => app.toggle_selected(now),
                KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(now),
                KeyCode::Char('a') => app.start_add(),
                KeyCode::Char('s') => app.cycle_status(now),
                KeyCode::Char('c') => app.cycle_category(now),
                KeyCode::Char('f') => app.cycle_date(now),
                _ => {}
            }
        }
        InputMode::Adding => match code {
            KeyCode::Enter => app.handle_input(now),
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Char(c) => {
                app.input_buffer.push(c);
            }
            KeyCode::Backspace => {
                app.input_buffer.pop();
            }
            _ => {}
        }
    }
    false
}
