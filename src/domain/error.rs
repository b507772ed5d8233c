//! Domain error types.
//!
//! The trend engine itself is total and never produces these; they belong to
//! the collaborators around it (configuration, data sources, notification).

/// Top-level error type for hacotrend.
#[derive(Debug, thiserror::Error)]
pub enum HacoError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("no data for {symbol} ({timeframe})")]
    NoData { symbol: String, timeframe: String },

    #[error("notification via {channel} failed: {reason}")]
    Notify { channel: String, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&HacoError> for std::process::ExitCode {
    fn from(err: &HacoError) -> Self {
        let code: u8 = match err {
            HacoError::Io(_) | HacoError::Json(_) => 1,
            HacoError::ConfigParse { .. }
            | HacoError::ConfigMissing { .. }
            | HacoError::ConfigInvalid { .. } => 2,
            HacoError::DataSource { .. } => 3,
            HacoError::Notify { .. } => 4,
            HacoError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
