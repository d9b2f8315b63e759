//! Application state and logic.

use crate::api::AssetSource;
use crate::engine::filter_and_sort;
use crate::models::{Asset, PriceFilter, SortMode, Theme};
use crate::render::Renderer;
use crate::theme::ThemeManager;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// The one message shown for any fetch failure.
pub const FETCH_ERROR_MESSAGE: &str = "Could not fetch crypto data. Please try again later.";

/// Which control receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Grid,
    Min,
    Max,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Grid => Focus::Min,
            Focus::Min => Focus::Max,
            Focus::Max => Focus::Grid,
        }
    }
}

/// Application state.
pub struct App<S, R> {
    /// Where the base list comes from
    source: S,
    /// Draws the display list
    pub renderer: R,
    /// Base list, in API order
    pub assets: Vec<Asset>,
    /// Filtered and sorted view of `assets`
    pub display: Vec<Asset>,
    /// Raw text of the minimum price input
    pub min_input: String,
    /// Raw text of the maximum price input
    pub max_input: String,
    /// Current sort mode
    pub sort_mode: SortMode,
    /// Theme preference
    pub theme: ThemeManager,
    /// Loading indicator; also marks a pending fetch
    pub loading: bool,
    /// Error banner text
    pub error: Option<String>,
    /// Focused control
    pub focus: Focus,
    /// First visible card row
    pub scroll: usize,
    /// Show help overlay
    pub show_help: bool,
    /// Last successful fetch
    pub last_refresh: Option<Instant>,
    /// Is the app running
    running: bool,
}

impl<S: AssetSource, R: Renderer> App<S, R> {
    pub fn new(source: S, renderer: R, theme: ThemeManager) -> Self {
        Self {
            source,
            renderer,
            assets: Vec::new(),
            display: Vec::new(),
            min_input: String::new(),
            max_input: String::new(),
            sort_mode: SortMode::Default,
            theme,
            loading: false,
            error: None,
            focus: Focus::Grid,
            scroll: 0,
            show_help: false,
            last_refresh: None,
            running: true,
        }
    }

    /// Preset the filter inputs and sort mode (from the command line).
    pub fn with_filters(mut self, min: Option<String>, max: Option<String>, sort: SortMode) -> Self {
        self.min_input = min.unwrap_or_default();
        self.max_input = max.unwrap_or_default();
        self.sort_mode = sort;
        self
    }

    /// Ask for a fetch on the next loop turn.
    ///
    /// Returns `false` when a fetch is already pending; the request is dropped.
    pub fn request_refresh(&mut self) -> bool {
        if self.loading {
            debug!("refresh already pending, ignoring request");
            return false;
        }
        self.loading = true;
        true
    }

    /// Fetch the base list and redraw.
    ///
    /// On failure the base list is kept and the error banner is shown.
    pub async fn fetch_assets(&mut self) {
        self.loading = true;
        let result = self.source.fetch_assets().await;
        self.loading = false;

        match result {
            Ok(assets) => {
                info!(count = assets.len(), "fetched market data");
                self.assets = assets;
                self.error = None;
                self.last_refresh = Some(Instant::now());
                self.apply_filters_and_sort();
            }
            Err(e) => {
                warn!(error = %e, "market data fetch failed");
                self.error = Some(FETCH_ERROR_MESSAGE.to_string());
            }
        }
    }

    /// Current price range parsed from the inputs.
    pub fn price_filter(&self) -> PriceFilter {
        PriceFilter::from_inputs(&self.min_input, &self.max_input)
    }

    /// Recompute the display list from the base list and render it.
    pub fn apply_filters_and_sort(&mut self) {
        let filter = self.price_filter();
        self.display = filter_and_sort(&self.assets, &filter, self.sort_mode);
        self.scroll = 0;
        debug!(
            shown = self.display.len(),
            total = self.assets.len(),
            min = filter.lower(),
            max = filter.upper(),
            sort = ?self.sort_mode,
            "applied filters"
        );
        self.renderer.render(&self.display);
    }

    /// Advance to the next sort mode.
    pub fn cycle_sort(&mut self) {
        self.sort_mode = self.sort_mode.next();
        self.apply_filters_and_sort();
    }

    /// Empty both bounds and go back to default order.
    pub fn clear_filters(&mut self) {
        self.min_input.clear();
        self.max_input.clear();
        self.sort_mode = SortMode::Default;
        self.apply_filters_and_sort();
    }

    /// Text of the sort control.
    pub fn sort_label(&self) -> &'static str {
        self.sort_mode.label()
    }

    pub fn set_min_input(&mut self, text: &str) {
        self.min_input = text.to_string();
        self.apply_filters_and_sort();
    }

    pub fn set_max_input(&mut self, text: &str) {
        self.max_input = text.to_string();
        self.apply_filters_and_sort();
    }

    /// Move focus Grid → Min → Max → Grid.
    pub fn cycle_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Leave the focused input.
    pub fn unfocus(&mut self) {
        self.focus = Focus::Grid;
    }

    fn focused_input(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Grid => None,
            Focus::Min => Some(&mut self.min_input),
            Focus::Max => Some(&mut self.max_input),
        }
    }

    /// Type a character into the focused input.
    pub fn push_char(&mut self, c: char) {
        if let Some(input) = self.focused_input() {
            input.push(c);
            self.apply_filters_and_sort();
        }
    }

    /// Delete the last character of the focused input.
    pub fn pop_char(&mut self) {
        if let Some(input) = self.focused_input() {
            if input.pop().is_some() {
                self.apply_filters_and_sort();
            }
        }
    }

    /// Flip light/dark and persist it.
    pub fn toggle_theme(&mut self) {
        if let Err(e) = self.theme.toggle() {
            warn!("Failed to save theme preference: {:#}", e);
        }
    }

    pub fn current_theme(&self) -> Theme {
        self.theme.theme()
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        if self.scroll + 1 < self.display.len() {
            self.scroll += 1;
        }
    }

    /// Keep the scroll offset within what the grid can show.
    pub fn clamp_scroll(&mut self, max: usize) {
        self.scroll = self.scroll.min(max);
    }

    /// Toggle help display.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn should_quit(&self) -> bool {
        !self.running
    }

    /// Get time since last refresh as human readable string.
    pub fn time_since_refresh(&self) -> String {
        match self.last_refresh {
            Some(t) => format!(
                "{} ago",
                humantime::format_duration(Duration::from_secs(t.elapsed().as_secs()))
            ),
            None => "never".to_string(),
        }
    }
}
