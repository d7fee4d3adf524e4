//! Error types for configuration loading and validation.

use bridge_common::{FormatError, ParseFrequencyError};

/// Errors that can occur when loading or validating a `bridge.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// The format or lane selection is not supported.
    #[error("invalid core selection: {0}")]
    Format(#[from] FormatError),

    /// A clock frequency string could not be parsed.
    #[error("invalid frequency for clocks.{field}: {source}")]
    InvalidFrequency {
        /// The clock field name.
        field: &'static str,
        /// The underlying parse error.
        #[source]
        source: ParseFrequencyError,
    },

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}
