//! Error types for glint

use thiserror::Error;

/// The main error type for glint operations
#[derive(Debug, Error)]
pub enum GlintError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Missing effect target: {0}")]
    MissingTarget(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),

    #[error("Invalid easing curve: {0}")]
    EaseParseError(String),

    #[error("Invalid colour: {0}")]
    ColorParseError(String),

    #[error("Effect error: {0}")]
    EffectError(String),
}

/// Result type alias for glint operations
pub type Result<T> = std::result::Result<T, GlintError>;

impl From<toml::de::Error> for GlintError {
    fn from(err: toml::de::Error) -> Self {
        GlintError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for GlintError {
    fn from(err: toml::ser::Error) -> Self {
        GlintError::TomlSerError(err.to_string())
    }
}
