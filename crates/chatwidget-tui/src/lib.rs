//! chatwidget-tui: Terminal UI for the chatwidget assistant client
//!
//! This crate provides the terminal front end:
//! - A launcher that toggles the chat panel
//! - The chat panel (message log, input field, quick actions)
//! - Transcript export as HTML

mod app;
mod event;
mod export;
mod input;
#[cfg(test)]
pub mod test_utils;
mod text;
mod theme;
mod ui;
mod view;
mod widgets;

pub use app::App;
pub use chatwidget_engine;
pub use event::{Action, Event, EventHandler};
pub use export::{export_transcript, ExportError};
pub use theme::Theme;
pub use view::TuiView;

use chatwidget_engine::{ChatTransport, Config, ControllerEvent, HttpTransport};
use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture, KeyEventKind, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::path::Path;
use tokio::sync::mpsc;
use tracing::info;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Run the TUI against the configured chat endpoint.
///
/// Sets up the terminal, runs the event loop, and restores the terminal on
/// exit. Exported transcripts land in `export_dir`.
pub async fn run_tui(
    config: &Config,
    export_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let transport = HttpTransport::from_config(config);
    info!(url = transport.url(), "starting chat widget");

    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (mut app, mut controller_events) = App::new(transport, config, export_dir.to_path_buf());

    // 4 Hz tick rate
    let mut events = EventHandler::new(250);

    let result = run_loop(&mut terminal, &mut app, &mut events, &mut controller_events).await;

    terminal.show_cursor()?;

    result
}

async fn run_loop<T: ChatTransport>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<T>,
    events: &mut EventHandler,
    controller_events: &mut mpsc::UnboundedReceiver<ControllerEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            ui::render(app, area, frame.buffer_mut());
        })?;

        tokio::select! {
            Some(event) = events.next() => match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_action(event::key_to_action(key));
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => app.handle_action(Action::ScrollUp),
                    MouseEventKind::ScrollDown => app.handle_action(Action::ScrollDown),
                    _ => {}
                },
                // Resize is picked up by the next draw
                Event::Key(_) | Event::Tick | Event::Resize(_, _) => {}
            },
            Some(event) = controller_events.recv() => app.handle_controller_event(event),
            else => break,
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Returns the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
