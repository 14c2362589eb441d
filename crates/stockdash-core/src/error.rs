use thiserror::Error;

/// Validation and contract errors exposed by `stockdash-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol contains invalid character {ch:?} at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("date must be ISO 8601 (YYYY-MM-DD): '{value}'")]
    InvalidDate { value: String },
    #[error("period must span at least one day")]
    NonPositivePeriod,
    #[error("date arithmetic out of range: {days} days before {from}")]
    DateOutOfRange { days: u32, from: String },
    #[error("invalid period '{value}', expected one of 5d, 1m, 3m, 6m, 1y")]
    InvalidPeriod { value: String },
    #[error("invalid moving average '{value}', expected one of sma5, sma20, sma40")]
    InvalidMovingAverage { value: String },
}

/// Configuration errors raised while reading environment or flag values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must not be empty")]
    Empty { key: &'static str },
    #[error("{key} has invalid value '{value}': {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Reasons a range fetch can fail. The orchestrator collapses all of them
/// into a single failed outcome.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("transport error: {message}")]
    Transport { message: String, retryable: bool },
    #[error("upstream returned status {status}")]
    Status { status: u16 },
    #[error("failed to parse stock payload: {0}")]
    Parse(String),
    #[error("unexpected stock payload shape: {0}")]
    Shape(String),
}

impl FetchError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "fetch.transport",
            Self::Status { .. } => "fetch.status",
            Self::Parse(_) => "fetch.parse",
            Self::Shape(_) => "fetch.shape",
        }
    }
}
