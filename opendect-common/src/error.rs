//! Error types for the opendect stack

use thiserror::Error;

/// Error type shared by the opendect crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Protocol-related errors.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Network I/O errors.
    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    /// Message buffer capacity or underflow errors.
    #[error("Buffer error: {0}")]
    Buffer(String),

    /// Identity encoding errors.
    #[error("Identity error: {0}")]
    Identity(String),

    /// YAML parsing errors.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}
