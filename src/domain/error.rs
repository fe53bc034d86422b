//! Domain error types.

/// Top-level error type for rsi-trend.
#[derive(Debug, thiserror::Error)]
pub enum TraderError {
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

    #[error("{source_name} fetch failed for {symbol}: {reason}")]
    DataFetch {
        source_name: String,
        symbol: String,
        reason: String,
    },

    #[error("data parse error for {symbol}: {reason}")]
    DataParse { symbol: String, reason: String },

    #[error("report error ({sheet}): {reason}")]
    Report { sheet: String, reason: String },

    #[error("notification error: {reason}")]
    Notify { reason: String },

    #[error("model error: {reason}")]
    Model { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TraderError> for std::process::ExitCode {
    fn from(err: &TraderError) -> Self {
        let code: u8 = match err {
            TraderError::Io(_) => 1,
            TraderError::ConfigParse { .. }
            | TraderError::ConfigMissing { .. }
            | TraderError::ConfigInvalid { .. } => 2,
            TraderError::DataFetch { .. } | TraderError::DataParse { .. } => 3,
            TraderError::Report { .. }
            | TraderError::Notify { .. }
            | TraderError::Model { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_config_invalid() {
        let err = TraderError::ConfigInvalid {
            section: "strategy".into(),
            key: "rsi_period".into(),
            reason: "must be positive".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value [strategy] rsi_period: must be positive"
        );
    }

    #[test]
    fn display_data_fetch() {
        let err = TraderError::DataFetch {
            source_name: "csv".into(),
            symbol: "TCS.NS".into(),
            reason: "file not found".into(),
        };
        assert_eq!(err.to_string(), "csv fetch failed for TCS.NS: file not found");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::other("boom");
        let err: TraderError = io.into();
        assert!(matches!(err, TraderError::Io(_)));
    }
}
