//! S-format codec errors

use thiserror::Error;

/// Errors surfaced by the S-format message codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SfmtError {
    /// A mandatory information element was not present.
    #[error("Mandatory IE missing: {0}")]
    MandatoryIeMissing(&'static str),

    /// A mandatory information element failed to parse.
    #[error("Mandatory IE error: {0}")]
    MandatoryIeError(&'static str),

    /// An information element is invalid in this context, has no codec, or
    /// is forbidden in the transmission direction.
    #[error("Invalid IE: {0}")]
    InvalidIe(&'static str),

    /// The message buffer ended inside an IE header or payload.
    #[error("Truncated message")]
    Truncated,

    /// An IE payload violates its octet-level coding rules.
    #[error("Invalid IE contents: {0}")]
    InvalidContents(&'static str),
}

/// Result type for S-format codec operations.
pub type SfmtResult<T> = Result<T, SfmtError>;
