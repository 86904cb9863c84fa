pub mod app;
pub mod views;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use self::app::App;
use crate::canvas::client::HttpFlowApi;

/// Main entry point for the TUI.
pub async fn run(server_url: String) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let api = Arc::new(HttpFlowApi::new(server_url.clone()));
    let mut app = App::new(server_url, api);

    let result = run_loop(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|frame| views::canvas::render(frame, app))?;

        // Poll with a timeout so finished requests are picked up between keys
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key);
                }
            }
        }

        app.poll_outcomes();
        // Let spawned requests make progress on the runtime
        tokio::task::yield_now().await;

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: event::KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => app.should_quit = true,
        KeyCode::Char('r') if ctrl => app.run_flow(),
        KeyCode::Char('s') if ctrl => app.save_flow(),
        KeyCode::Left if alt => app.nudge_selected(-1.0, 0.0),
        KeyCode::Right if alt => app.nudge_selected(1.0, 0.0),
        KeyCode::Up if alt => app.nudge_selected(0.0, -1.0),
        KeyCode::Down if alt => app.nudge_selected(0.0, 1.0),
        KeyCode::Tab => app.cycle_selection(),
        KeyCode::Esc => app.clear_selection(),
        KeyCode::Enter => app.input_newline(),
        KeyCode::Backspace => app.input_backspace(),
        KeyCode::Char(c) if !ctrl && !alt => app.input_char(c),
        _ => {}
    }
}
