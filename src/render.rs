//! Turning the display list into asset cards.

use crate::models::Asset;
use num_format::{Locale, ToFormattedString};

/// Shown instead of cards when nothing matches the filters.
pub const EMPTY_MESSAGE: &str = "No cryptocurrencies match your filters.";

/// Something that can draw the display list.
///
/// Every call replaces whatever was drawn before.
pub trait Renderer {
    fn render(&mut self, assets: &[Asset]);
}

/// Direction of the 24h change, selects the card colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Gain,
    Loss,
}

impl Tone {
    pub fn of(change_percent: f64) -> Self {
        if change_percent >= 0.0 {
            Tone::Gain
        } else {
            Tone::Loss
        }
    }
}

/// Formatted view of one asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub icon: String,
    pub name: String,
    pub symbol: String,
    pub price: String,
    pub change: String,
    pub tone: Tone,
}

impl Card {
    pub fn from_asset(asset: &Asset, locale: &Locale) -> Self {
        Self {
            icon: asset.image.clone(),
            name: asset.name.clone(),
            symbol: asset.symbol.to_uppercase(),
            price: format_price(asset.current_price, locale),
            change: format_change(asset.price_change_percentage_24h),
            tone: Tone::of(asset.price_change_percentage_24h),
        }
    }

    /// One- or two-character badge standing in for the icon image.
    pub fn badge(&self) -> String {
        self.symbol.chars().take(2).collect()
    }
}

/// Cards for the interactive grid, rebuilt on every render.
#[derive(Debug)]
pub struct CardDeck {
    cards: Vec<Card>,
    locale: Locale,
    renders: u64,
}

impl CardDeck {
    pub fn new(locale: Locale) -> Self {
        Self {
            cards: Vec::new(),
            locale,
            renders: 0,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Whether anything has been rendered yet.
    pub fn has_rendered(&self) -> bool {
        self.renders > 0
    }
}

impl Renderer for CardDeck {
    fn render(&mut self, assets: &[Asset]) {
        self.cards = assets
            .iter()
            .map(|asset| Card::from_asset(asset, &self.locale))
            .collect();
        self.renders += 1;
    }
}

/// Format a USD price with grouped thousands and exactly two decimals.
pub fn format_price(price: f64, locale: &Locale) -> String {
    let cents = (price.abs() * 100.0).round() as u64;
    let sign = if price < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{}${}{}{:02}",
        sign,
        (cents / 100).to_formatted_string(locale),
        locale.decimal(),
        cents % 100
    )
}

/// Format a 24h change as `+1.23%` / `-4.56%`.
pub fn format_change(change_percent: f64) -> String {
    if change_percent >= 0.0 {
        format!("+{:.2}%", change_percent)
    } else {
        format!("{:.2}%", change_percent)
    }
}

/// Resolve a locale name from configuration, falling back to `en`.
pub fn locale_from_name(name: &str) -> Locale {
    Locale::from_name(name).unwrap_or(Locale::en)
}
