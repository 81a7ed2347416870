//! NWK-layer errors

use thiserror::Error;

use opendect_sformat::SfmtError;

/// Errors surfaced by the NWK-layer entities.
#[derive(Debug, Error)]
pub enum Error {
    /// No transaction could be allocated within the protocol's limit.
    #[error("Transaction limit reached")]
    Overload,

    /// The referenced call or transaction does not exist.
    #[error("Unknown transaction")]
    UnknownTransaction,

    /// The primitive is not valid in the current protocol state.
    #[error("Invalid state for primitive")]
    InvalidState,

    /// The protocol discriminator is not registered.
    #[error("Unknown protocol")]
    UnknownProtocol,

    /// Message encoding failed.
    #[error("Codec error: {0}")]
    Codec(#[from] SfmtError),

    /// Buffer handling failed.
    #[error("Buffer error: {0}")]
    Buffer(#[from] opendect_common::Error),

    /// Socket I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for NWK-layer operations.
pub type Result<T> = std::result::Result<T, Error>;
