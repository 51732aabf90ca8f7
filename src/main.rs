mod app;
mod braille;
mod data;
mod geo;
mod map;
mod stats;
mod ui;

use anyhow::Result;
use app::{App, Phase};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use data::RegionSource;
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Log to a file so the TUI stays clean
    let log_file = std::fs::File::create("globe-hopper.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    // The only configuration: the geo data base directory
    let base_dir = std::env::args().nth(1).unwrap_or_else(|| "data".to_string());

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal, RegionSource::new(base_dir));

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Handle mouse events for hovering, selecting, rotating, and zooming
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for the cursor marker and hover highlight
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel for zooming towards mouse position
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Click to select, drag to rotate
        MouseEventKind::Down(MouseButton::Left) => {
            app.begin_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.handle_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            // A click without drag selects the region under the cursor
            if !app.drag_moved {
                app.click_at(mouse.column, mouse.row, Instant::now());
            }
            app.end_drag();
        }
        _ => {}
    }
}

fn handle_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.quit(),

        KeyCode::Esc => match app.phase {
            Phase::Provinces => {
                if app.selected_province.is_some() {
                    app.dismiss_panel();
                } else {
                    app.go_back();
                }
            }
            Phase::Clouds => {}
            _ => app.quit(),
        },

        // Intro city cursor + start
        KeyCode::Up | KeyCode::Char('k') if app.phase == Phase::Intro => app.city_prev(),
        KeyCode::Down | KeyCode::Char('j') if app.phase == Phase::Intro => app.city_next(),
        KeyCode::Enter if app.phase == Phase::Intro => app.start_journey(),

        // Zoom
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

        // Province view actions
        KeyCode::Char('b') => app.go_back(),
        KeyCode::Char('f') => app.flip_panel(),
        KeyCode::Char('x') => app.dismiss_panel(),

        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, source: RegionSource) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(size.width as usize, size.height as usize, source);

    // One-time world load; applied from the event loop when it lands
    app.load_world();

    // Main loop
    loop {
        // Draw
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        handle_key(&mut app, key.code);
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width as usize, height as usize);
                }
                _ => {}
            }
        }

        // Advance the clouds timer, camera flight, and finished fetches
        app.tick(Instant::now());

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
