//! Price-range filtering and price sorting.

use crate::models::{Asset, PriceFilter, SortMode};

/// Derive the display list from the base list.
///
/// Keeps assets whose price lies inside `filter` (inclusive). `Default` keeps
/// base order; the price sorts are stable, so equal prices keep base order too.
pub fn filter_and_sort(base: &[Asset], filter: &PriceFilter, mode: SortMode) -> Vec<Asset> {
    let mut display: Vec<Asset> = base
        .iter()
        .filter(|asset| filter.matches(asset.current_price))
        .cloned()
        .collect();

    match mode {
        SortMode::Default => {}
        SortMode::Ascending => display.sort_by(|a, b| {
            a.current_price
                .partial_cmp(&b.current_price)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
        SortMode::Descending => display.sort_by(|a, b| {
            b.current_price
                .partial_cmp(&a.current_price)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
    }

    display
}
