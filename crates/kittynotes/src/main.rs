use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::LevelFilter;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{io, time::Duration};

use kittynotes::app::App;
use kittynotes::ui;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger with debug fallback for development
    let mut logger = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Info);
        logger.filter_module("kittynotes", LevelFilter::Debug);
    }
    logger.init();

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    // Setup terminal
    if let Err(e) = enable_raw_mode() {
        eprintln!("Failed to initialize the terminal: {}", e);
        return Err(e.into());
    }
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
        let _ = disable_raw_mode();
        eprintln!("Failed to configure the terminal: {}", e);
        return Err(e.into());
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = match App::new().await {
        Ok(app) => {
            log::info!("Application initialized successfully");
            app
        }
        Err(e) => {
            restore_terminal()?;
            eprintln!("Failed to initialize the application: {}", e);
            if let Some(source) = e.source() {
                eprintln!("Details: {}", source);
            }
            return Err(e);
        }
    };

    app.greet_on_first_run();

    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    restore_terminal()?;

    if let Err(err) = res {
        eprintln!("An error occurred while running the application: {}", err);
        if let Some(source) = err.source() {
            eprintln!("Caused by: {}", source);
        }
        log::error!("Application error: {}", err);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    loop {
        // Draw UI
        if let Err(e) = terminal.draw(|f| ui::draw(f, &mut app)) {
            log::error!("Terminal draw error: {}", e);
            // Continue running despite draw errors
        }

        // Advance notification lifecycles
        app.update();

        // Write out pending changes once the debounce window has passed
        if app.store.flush_due() {
            app.store.flush().await;
        }

        if app.should_quit() {
            app.store.flush_now().await;
            log::info!("Application shutdown requested");
            break;
        }

        // Handle events
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    if let Err(e) = handle_key_event_safe(key, &mut app).await {
                        log::error!("Key event handling error: {}", e);
                    }
                }
                Event::Mouse(mouse) => {
                    app.handle_mouse_event(mouse);
                }
                Event::Resize(_, _) => {
                    log::debug!("Terminal resized");
                    // Handled implicitly through the next draw
                }
                _ => {}
            }
        }
    }

    log::info!("Application loop ended successfully");
    Ok(())
}

async fn handle_key_event_safe(key: crossterm::event::KeyEvent, app: &mut App) -> Result<()> {
    // Ctrl+C is an emergency exit regardless of mode; pending changes are
    // flushed by the shutdown path.
    if key.code == KeyCode::Char('c') && key.modifiers.contains(event::KeyModifiers::CONTROL) {
        log::info!("Emergency exit requested via Ctrl+C");
        app.quit();
        return Ok(());
    }

    app.handle_key_event(key).await
}

/// Restore terminal to normal state
fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen, DisableMouseCapture)?;
    // Attempt to show cursor, but don't fail if it errors
    let _ = execute!(stdout, crossterm::cursor::Show);
    Ok(())
}
