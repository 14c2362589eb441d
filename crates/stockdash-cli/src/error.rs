use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] stockdash_core::ValidationError),

    #[error(transparent)]
    Config(#[from] stockdash_core::ConfigError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("failed to install log subscriber: {0}")]
    Logging(#[from] tracing::subscriber::SetGlobalDefaultError),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(_) => 2,
            Self::Serialization(_) => 4,
            Self::Logging(_) => 10,
        }
    }
}
