//! Domain error types.

use crate::domain::batch::SymbolListError;

/// Top-level error type for bandrevert.
#[derive(Debug, thiserror::Error)]
pub enum BandRevertError {
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
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("malformed data for {symbol}: {reason}")]
    MalformedData { symbol: String, reason: String },

    #[error(transparent)]
    Symbols(#[from] SymbolListError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BandRevertError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        BandRevertError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(symbol: &str, reason: impl Into<String>) -> Self {
        BandRevertError::MalformedData {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&BandRevertError> for std::process::ExitCode {
    fn from(err: &BandRevertError) -> Self {
        let code: u8 = match err {
            BandRevertError::Io(_) => 1,
            BandRevertError::ConfigParse { .. }
            | BandRevertError::ConfigMissing { .. }
            | BandRevertError::ConfigInvalid { .. } => 2,
            BandRevertError::Data { .. } => 3,
            BandRevertError::Symbols(_) => 4,
            BandRevertError::NoData { .. } | BandRevertError::MalformedData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
