//! CLI argument definitions for stockdash.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `table` | Overview table of stock records |
//! | `chart` | Close-price, candlestick and SMA series for one symbol |
//! | `periods` | Quick-select periods and the ranges they resolve to |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--mock` | `false` | Serve built-in sample records instead of calling the API |
//! | `--base-url` | env / `http://localhost:8080` | Stock API base URL |
//! | `--timeout-ms` | env / `3000` | Request timeout in ms |
//! | `--trace` | `warn` | Log level written to stderr |
//!
//! # Examples
//!
//! ```bash
//! stockdash --mock table
//! stockdash chart aapl --period 3m --kind candle
//! stockdash --format json --pretty chart MSFT --start 2025-01-01 --end 2025-02-01 --overlay sma20
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use stockdash_core::{FailurePolicy, MovingAverage, Period};
use tracing::Level;

#[derive(Debug, Parser)]
#[command(
    name = "stockdash",
    author,
    version,
    about = "Stock price dashboard for the terminal",
    long_about = "stockdash fetches daily stock records from the stock API and renders them \
as an overview table or as chart-ready series (close line, candlesticks, SMA overlays).\n\
\n\
Configuration is read from STOCKDASH_* environment variables; flags override them."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Serve built-in sample records instead of calling the API.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Stock API base URL (overrides STOCKDASH_API_BASE_URL).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in milliseconds (overrides STOCKDASH_TIMEOUT_MS).
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Log level written to stderr.
    #[arg(long, global = true, value_enum, default_value_t = TraceLevel::Warn)]
    pub trace: TraceLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text table.
    Table,
    /// Single JSON document.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TraceLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<TraceLevel> for Level {
    fn from(value: TraceLevel) -> Self {
        match value {
            TraceLevel::Error => Level::ERROR,
            TraceLevel::Warn => Level::WARN,
            TraceLevel::Info => Level::INFO,
            TraceLevel::Debug => Level::DEBUG,
            TraceLevel::Trace => Level::TRACE,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Overview table of stock records.
    ///
    /// With --mock and no symbols, shows the built-in sample rows.
    ///
    ///   stockdash --mock table
    ///   stockdash table AAPL MSFT --period 5d
    Table(TableArgs),

    /// Chart series for one symbol.
    ///
    /// With --mock, ranges end on 2025-02-22, the newest sample date.
    ///
    ///   stockdash chart AAPL
    ///   stockdash chart tsla --period 6m --kind both --overlay sma5 --overlay sma20
    Chart(ChartArgs),

    /// List quick-select periods and the ranges they resolve to today.
    Periods,
}

#[derive(Debug, Args)]
pub struct TableArgs {
    /// Symbols to list; defaults to STOCKDASH_DEFAULT_SYMBOL.
    pub symbols: Vec<String>,

    #[command(flatten)]
    pub range: RangeArgs,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    /// Symbol to chart; defaults to STOCKDASH_DEFAULT_SYMBOL.
    pub symbol: Option<String>,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Which price series to render.
    #[arg(long, value_enum, default_value_t = ChartKind::Line)]
    pub kind: ChartKind,

    /// Moving-average overlays to include (repeatable).
    #[arg(long = "overlay", value_enum)]
    pub overlays: Vec<OverlayArg>,

    /// Expect sma5/sma20/sma40 in the payload and default them to 0.
    #[arg(long, default_value_t = false)]
    pub with_sma: bool,

    /// Behaviour when the fetch fails (overrides STOCKDASH_FAILURE_POLICY).
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,
}

#[derive(Debug, Args)]
pub struct RangeArgs {
    /// Quick-select period: 5d, 1m, 3m, 6m, 1y.
    #[arg(long)]
    pub period: Option<Period>,

    /// Start date (YYYY-MM-DD); replaces the period's start.
    #[arg(long)]
    pub start: Option<String>,

    /// End date (YYYY-MM-DD); replaces the period's end.
    #[arg(long)]
    pub end: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartKind {
    /// Close-price line.
    Line,
    /// OHLC candlesticks.
    Candle,
    /// Both line and candlesticks.
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OverlayArg {
    Sma5,
    Sma20,
    Sma40,
}

impl From<OverlayArg> for MovingAverage {
    fn from(value: OverlayArg) -> Self {
        match value {
            OverlayArg::Sma5 => MovingAverage::Sma5,
            OverlayArg::Sma20 => MovingAverage::Sma20,
            OverlayArg::Sma40 => MovingAverage::Sma40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Show no records after a failed fetch.
    Clear,
    /// Keep the last successful records after a failed fetch.
    Retain,
}

impl From<PolicyArg> for FailurePolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Clear => FailurePolicy::Clear,
            PolicyArg::Retain => FailurePolicy::RetainStale,
        }
    }
}
