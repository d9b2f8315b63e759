//! Command-line interface.

use crate::export::ExportFormat;
use crate::models::SortMode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// A terminal dashboard for browsing cryptocurrency market prices.
///
/// Fetches the top 50 cryptocurrencies by market cap from CoinGecko and shows
/// them as cards that can be filtered by price range and sorted by price.
#[derive(Parser, Debug, Clone)]
#[command(name = "coindeck")]
#[command(version)]
#[command(about = "A terminal dashboard for cryptocurrency prices", long_about = None)]
pub struct Args {
    /// Minimum price (USD). Non-numeric values mean no bound.
    #[arg(long, allow_hyphen_values = true, env = "COINDECK_MIN")]
    pub min: Option<String>,

    /// Maximum price (USD). Non-numeric values mean no bound.
    #[arg(long, allow_hyphen_values = true, env = "COINDECK_MAX")]
    pub max: Option<String>,

    /// Initial sort order
    #[arg(short = 'o', long, value_enum, default_value = "default")]
    pub sort: SortField,

    /// Batch mode - print the filtered list once and exit
    #[arg(short = 'b', long)]
    pub batch: bool,

    /// Output format for batch mode
    #[arg(long, value_enum, default_value = "text")]
    pub export: ExportField,

    /// Configuration file path
    #[arg(short = 'c', long, env = "COINDECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Market data API base URL (overrides the config file)
    #[arg(long, env = "COINDECK_API_URL")]
    pub api_url: Option<String>,

    /// API timeout in seconds (overrides the config file)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Log file for interactive mode
    #[arg(long, env = "COINDECK_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Print a sample configuration file and exit
    #[arg(long)]
    pub print_config: bool,
}

/// Sort options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum SortField {
    /// Market cap order, as returned by the API
    #[default]
    Default,
    /// Highest price first
    HighToLow,
    /// Lowest price first
    LowToHigh,
}

impl From<SortField> for SortMode {
    fn from(field: SortField) -> Self {
        match field {
            SortField::Default => SortMode::Default,
            SortField::HighToLow => SortMode::Descending,
            SortField::LowToHigh => SortMode::Ascending,
        }
    }
}

/// Batch output formats.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum ExportField {
    /// Card-like plain text
    #[default]
    Text,
    /// Comma-separated values (CSV)
    Csv,
    /// JavaScript Object Notation (JSON)
    Json,
}

impl From<ExportField> for ExportFormat {
    fn from(field: ExportField) -> Self {
        match field {
            ExportField::Text => ExportFormat::Text,
            ExportField::Csv => ExportFormat::Csv,
            ExportField::Json => ExportFormat::Json,
        }
    }
}

impl Args {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Args::parse()
    }
}
