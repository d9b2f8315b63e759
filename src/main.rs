//! coindeck - a terminal dashboard for cryptocurrency prices.

mod api;
mod app;
mod cli;
mod config;
mod engine;
mod export;
mod logging;
mod models;
mod render;
mod theme;
mod ui;

use anyhow::{Context, Result, bail};
use api::{AssetSource, CoinGeckoClient};
use app::{App, FETCH_ERROR_MESSAGE};
use cli::Args;
use config::{ColorConfig, Config};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use export::ExportRenderer;
use ratatui::{Terminal, backend::CrosstermBackend};
use render::{CardDeck, Renderer, locale_from_name};
use std::io;
use std::time::Duration;
use theme::{FileStore, MemoryStore, PreferenceStore, ThemeManager};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse_args();

    if args.print_config {
        print!("{}", config::sample_config());
        return Ok(());
    }

    init_logging(&args);

    // Load configuration
    let mut config = if let Some(ref path) = args.config {
        Config::load(path)?
    } else {
        Config::load_or_default()
    };
    if let Some(ref url) = args.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(timeout) = args.timeout {
        config.api.timeout = timeout;
    }

    let client = CoinGeckoClient::new(&config.api.base_url, config.api.timeout)?;
    let locale = locale_from_name(&config.display.locale);
    let theme = ThemeManager::load(open_preferences());
    info!(base_url = %config.api.base_url, theme = %theme.theme(), "starting");

    if args.batch {
        let renderer = ExportRenderer::new(io::stdout(), args.export.into(), locale);
        let mut app = App::new(client, renderer, theme).with_filters(
            args.min.clone(),
            args.max.clone(),
            args.sort.into(),
        );
        run_batch(&mut app).await
    } else {
        let mut app = App::new(client, CardDeck::new(locale), theme).with_filters(
            args.min.clone(),
            args.max.clone(),
            args.sort.into(),
        );
        run_interactive(&mut app, &config.colors).await
    }
}

/// Interactive mode logs to a file; batch mode to stderr.
fn init_logging(args: &Args) {
    let result = if args.batch {
        logging::init_stderr()
    } else {
        match args.log_file.clone().or_else(logging::default_log_path) {
            Some(path) => logging::init_file(&path),
            None => Ok(()),
        }
    };

    if let Err(e) = result {
        eprintln!("Warning: logging disabled: {:#}", e);
    }
}

fn open_preferences() -> Box<dyn PreferenceStore> {
    match FileStore::default_path() {
        Some(path) => {
            let store = FileStore::open(path);
            info!(path = %store.path().display(), "theme preferences");
            Box::new(store)
        }
        None => {
            warn!("no config directory, theme preference will not persist");
            Box::new(MemoryStore::default())
        }
    }
}

/// Run in batch mode: fetch once, print, exit.
async fn run_batch(app: &mut App<CoinGeckoClient, ExportRenderer<io::Stdout>>) -> Result<()> {
    app.fetch_assets().await;

    if app.error.is_some() {
        bail!(FETCH_ERROR_MESSAGE);
    }

    if let Some(e) = app.renderer.take_error() {
        return Err(e).context("Failed to write output");
    }

    Ok(())
}

/// Run in interactive mode with TUI.
async fn run_interactive(app: &mut App<CoinGeckoClient, CardDeck>, colors: &ColorConfig) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Initial fetch
    app.request_refresh();

    // Main loop
    let result = run_app(&mut terminal, app, colors).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Main application loop.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<CoinGeckoClient, CardDeck>,
    colors: &ColorConfig,
) -> Result<()> {
    let tick_rate = Duration::from_millis(250);

    loop {
        // Draw UI
        let mut max_scroll = 0;
        terminal.draw(|f| max_scroll = ui::render(f, app, colors))?;
        app.clamp_scroll(max_scroll);

        // A pending fetch runs after the loading indicator is on screen
        if app.loading {
            app.fetch_assets().await;
            continue;
        }

        // Handle events with timeout
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key_event(app, key.code, key.modifiers);
                }
            }
        }

        // Check if we should quit
        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

/// Handle keyboard input.
fn handle_key_event<S: AssetSource, R: Renderer>(
    app: &mut App<S, R>,
    code: KeyCode,
    modifiers: KeyModifiers,
) {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    // Close help overlay on any key
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Price inputs take typed text
    if app.focus != app::Focus::Grid {
        match code {
            KeyCode::Char(c) => app.push_char(c),
            KeyCode::Backspace => app.pop_char(),
            KeyCode::Tab => app.cycle_focus(),
            KeyCode::Enter | KeyCode::Esc => app.unfocus(),
            _ => {}
        }
        return;
    }

    match code {
        // Quit
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        // Filters and sorting
        KeyCode::Tab => app.cycle_focus(),
        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('c') => app.clear_filters(),

        // Display
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(),
        KeyCode::Char('h') | KeyCode::Char('?') => app.toggle_help(),

        // Refresh
        KeyCode::Char('r') => {
            app.request_refresh();
        }

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FetchError;
    use crate::app::Focus;
    use crate::models::{Asset, SortMode, Theme};
    use crate::theme::MemoryStore;

    struct NoSource;

    impl AssetSource for NoSource {
        async fn fetch_assets(&self) -> Result<Vec<Asset>, FetchError> {
            Ok(Vec::new())
        }
    }

    fn test_app() -> App<NoSource, CardDeck> {
        App::new(
            NoSource,
            CardDeck::new(num_format::Locale::en),
            ThemeManager::load(Box::new(MemoryStore::default())),
        )
    }

    fn press(app: &mut App<NoSource, CardDeck>, code: KeyCode) {
        handle_key_event(app, code, KeyModifiers::NONE);
    }

    #[test]
    fn test_grid_keys() {
        let mut app = test_app();

        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.sort_mode, SortMode::Descending);

        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.current_theme(), Theme::Dark);

        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.sort_mode, SortMode::Default);

        press(&mut app, KeyCode::Char('r'));
        assert!(app.loading);

        assert!(!app.should_quit());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }

    #[test]
    fn test_typed_q_goes_into_focused_input() {
        let mut app = test_app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Min);

        press(&mut app, KeyCode::Char('q'));
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.min_input, "qs");
        assert_eq!(app.sort_mode, SortMode::Default);
        assert!(!app.should_quit());

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.min_input, "q");
    }

    #[test]
    fn test_esc_leaves_input_without_quitting() {
        let mut app = test_app();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Max);
        press(&mut app, KeyCode::Char('5'));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.focus, Focus::Grid);
        assert_eq!(app.max_input, "5");
        assert!(!app.should_quit());

        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit());
    }

    #[test]
    fn test_any_key_closes_help() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);

        press(&mut app, KeyCode::Char('s'));
        assert!(!app.show_help);
        assert_eq!(app.sort_mode, SortMode::Default);

        press(&mut app, KeyCode::Char('h'));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(!app.should_quit());
    }

    #[test]
    fn test_ctrl_c_quits_from_input() {
        let mut app = test_app();
        press(&mut app, KeyCode::Tab);
        handle_key_event(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit());
        assert!(app.min_input.is_empty());
    }
}
