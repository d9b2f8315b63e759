//! Data models for cryptocurrency market snapshots and dashboard state.

/// One cryptocurrency's market snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    /// API identifier (e.g., "bitcoin")
    pub id: String,
    /// Ticker symbol as reported by the API (e.g., "btc")
    pub symbol: String,
    /// Display name (e.g., "Bitcoin")
    pub name: String,
    /// Icon URL
    pub image: String,
    /// Current price in USD
    pub current_price: f64,
    /// Percentage price change over the last 24 hours
    pub price_change_percentage_24h: f64,
}

impl Default for Asset {
    fn default() -> Self {
        Self {
            id: String::new(),
            symbol: String::new(),
            name: String::new(),
            image: String::new(),
            current_price: 0.0,
            price_change_percentage_24h: 0.0,
        }
    }
}

/// Sort mode for the display list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Keep the API order (market cap, descending)
    #[default]
    Default,
    /// Highest price first
    Descending,
    /// Lowest price first
    Ascending,
}

impl SortMode {
    /// Get the next sort mode in the rotation.
    pub fn next(self) -> Self {
        match self {
            SortMode::Default => SortMode::Descending,
            SortMode::Descending => SortMode::Ascending,
            SortMode::Ascending => SortMode::Default,
        }
    }

    /// Label shown on the sort control.
    pub fn label(&self) -> &'static str {
        match self {
            SortMode::Default => "Sort: Default",
            SortMode::Descending => "Sort: High to Low",
            SortMode::Ascending => "Sort: Low to High",
        }
    }
}

/// Parse a raw price-bound input.
///
/// Anything that is not a finite number (empty text, letters, `NaN`, `inf`)
/// means "no bound". Bad input is never an error.
pub fn parse_bound(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Inclusive price range. Absent bounds are open.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PriceFilter {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceFilter {
    /// Build a filter from the raw text of the two bound inputs.
    pub fn from_inputs(min: &str, max: &str) -> Self {
        Self {
            min: parse_bound(min),
            max: parse_bound(max),
        }
    }

    /// Effective lower bound.
    pub fn lower(&self) -> f64 {
        self.min.unwrap_or(0.0)
    }

    /// Effective upper bound.
    pub fn upper(&self) -> f64 {
        self.max.unwrap_or(f64::INFINITY)
    }

    pub fn matches(&self, price: f64) -> bool {
        self.lower() <= price && price <= self.upper()
    }
}

/// Light/dark UI preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Parse a stored value. Unknown values fall back to light.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    /// Icon shown on the theme toggle.
    pub fn icon(&self) -> &'static str {
        match self {
            Theme::Light => "☀",
            Theme::Dark => "☾",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
