//! Error types for keyboard-key

use thiserror::Error;

/// Result type alias for keyboard-key operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur at the edges of keyboard-key
///
/// The gesture controller and label resolver never fail; these cover
/// parsing user input and configuration files.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pitch string could not be parsed
    #[error("Invalid pitch: {0:?}")]
    InvalidPitch(String),

    /// Label mode name is unknown
    #[error("Unknown label mode: {0:?}")]
    InvalidLabelMode(String),

    /// Label alignment name is unknown
    #[error("Unknown alignment: {0:?}")]
    InvalidAlignment(String),

    /// Retap policy name is unknown
    #[error("Unknown retap policy: {0:?}")]
    InvalidRetapPolicy(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
