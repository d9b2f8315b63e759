//! Plain-text, CSV and JSON output of the display list.
//!
//! Used by batch mode, where the display list goes to stdout instead of the
//! card grid.

use crate::models::Asset;
use crate::render::{Card, EMPTY_MESSAGE, Renderer, Tone};
use num_format::Locale;
use serde::Serialize;
use std::io::{self, Write};
use tracing::warn;

/// Export format type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Text,
    Csv,
    Json,
}

/// Export assets in the specified format.
pub fn export_assets(assets: &[Asset], format: ExportFormat, locale: &Locale) -> String {
    match format {
        ExportFormat::Text => export_text(assets, locale),
        ExportFormat::Csv => export_csv(assets),
        ExportFormat::Json => export_json(assets),
    }
}

/// Cards as text blocks, one per asset.
fn export_text(assets: &[Asset], locale: &Locale) -> String {
    if assets.is_empty() {
        return format!("{}\n", EMPTY_MESSAGE);
    }

    let mut output = String::new();
    for asset in assets {
        let card = Card::from_asset(asset, locale);
        let arrow = match card.tone {
            Tone::Gain => "▲",
            Tone::Loss => "▼",
        };
        output.push_str(&format!("{} ({})\n", card.name, card.symbol));
        output.push_str(&format!("  Price: {}\n", card.price));
        output.push_str(&format!("  24h:   {} {}\n", card.change, arrow));
        output.push_str(&format!("  Icon:  {}\n", card.icon));
        output.push('\n');
    }

    output
}

/// Export as CSV (comma-separated values).
fn export_csv(assets: &[Asset]) -> String {
    let mut output = String::from("Id,Symbol,Name,Price,Change24h%,Image\n");

    for asset in assets {
        output.push_str(&format!(
            "{},{},{},{:.2},{:.2},{}\n",
            csv_field(&asset.id),
            csv_field(&asset.symbol.to_uppercase()),
            csv_field(&asset.name),
            asset.current_price,
            asset.price_change_percentage_24h,
            csv_field(&asset.image),
        ));
    }

    output
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportRecord<'a> {
    id: &'a str,
    symbol: String,
    name: &'a str,
    image: &'a str,
    current_price: f64,
    price_change_percentage_24h: f64,
}

/// Export as a JSON array.
fn export_json(assets: &[Asset]) -> String {
    let records: Vec<ExportRecord<'_>> = assets
        .iter()
        .map(|asset| ExportRecord {
            id: &asset.id,
            symbol: asset.symbol.to_uppercase(),
            name: &asset.name,
            image: &asset.image,
            current_price: asset.current_price,
            price_change_percentage_24h: asset.price_change_percentage_24h,
        })
        .collect();

    // Plain strings and finite numbers always serialize.
    let mut json = serde_json::to_string_pretty(&records).unwrap_or_else(|_| "[]".to_string());
    json.push('\n');
    json
}

/// Renderer that writes each display list to a writer.
///
/// The first write error is kept for the caller; later renders are skipped.
pub struct ExportRenderer<W: Write> {
    out: W,
    format: ExportFormat,
    locale: Locale,
    failed: Option<io::Error>,
}

impl<W: Write> ExportRenderer<W> {
    pub fn new(out: W, format: ExportFormat, locale: Locale) -> Self {
        Self {
            out,
            format,
            locale,
            failed: None,
        }
    }

    /// Take the write error, if any render failed.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.failed.take()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for ExportRenderer<W> {
    fn render(&mut self, assets: &[Asset]) {
        if self.failed.is_some() {
            return;
        }

        let output = export_assets(assets, self.format, &self.locale);
        if let Err(e) = self
            .out
            .write_all(output.as_bytes())
            .and_then(|_| self.out.flush())
        {
            warn!(error = %e, "failed to write export output");
            self.failed = Some(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_asset(symbol: &str, price: f64, change: f64) -> Asset {
        Asset {
            id: symbol.to_lowercase(),
            symbol: symbol.to_lowercase(),
            name: format!("{} Token", symbol),
            image: format!("https://img/{}.png", symbol.to_lowercase()),
            current_price: price,
            price_change_percentage_24h: change,
        }
    }

    #[test]
    fn test_export_text() {
        let assets = vec![create_test_asset("BTC", 64000.0, 2.0)];
        let text = export_text(&assets, &Locale::en);
        assert!(text.contains("BTC Token (BTC)"));
        assert!(text.contains("$64,000.00"));
        assert!(text.contains("+2.00% ▲"));
    }

    #[test]
    fn test_export_text_empty() {
        assert_eq!(export_text(&[], &Locale::en), format!("{}\n", EMPTY_MESSAGE));
    }

    #[test]
    fn test_export_csv() {
        let assets = vec![create_test_asset("ETH", 3000.0, -1.5)];
        let csv = export_csv(&assets);
        assert!(csv.starts_with("Id,Symbol,Name,Price"));
        assert!(csv.contains("\"eth\",\"ETH\",\"ETH Token\",3000.00,-1.50"));
    }

    #[test]
    fn test_csv_field_escapes_quotes() {
        assert_eq!(csv_field("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_export_json() {
        let assets = vec![create_test_asset("SOL", 150.0, 0.5)];
        let json = export_json(&assets);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["symbol"], "SOL");
        assert_eq!(parsed[0]["currentPrice"], 150.0);
        assert_eq!(parsed[0]["priceChangePercentage24h"], 0.5);
    }

    #[test]
    fn test_export_renderer_writes_each_render() {
        let mut renderer = ExportRenderer::new(Vec::new(), ExportFormat::Csv, Locale::en);
        renderer.render(&[create_test_asset("BTC", 1.0, 0.0)]);
        assert!(renderer.take_error().is_none());
        let written = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(written.lines().count(), 2);
    }

    /// Writer that refuses every write, like stdout on a full disk.
    struct FullWriter;

    impl Write for FullWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::StorageFull, "no space left on device"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_export_renderer_keeps_write_error() {
        let mut renderer = ExportRenderer::new(FullWriter, ExportFormat::Text, Locale::en);
        renderer.render(&[create_test_asset("BTC", 1.0, 0.0)]);
        renderer.render(&[]);

        let err = renderer.take_error().expect("write error kept");
        assert_eq!(err.kind(), io::ErrorKind::StorageFull);
        assert!(renderer.take_error().is_none());
    }
}
