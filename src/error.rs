//! Error types for the PhiComp codec.

use thiserror::Error;

/// Error variants for compression and decompression.
#[derive(Debug, Error)]
pub enum Error {
    /// The compressed container is malformed: too short, wrong magic
    /// bytes, or the decoded byte count does not match the header.
    #[error("invalid container: {0}")]
    InvalidContainer(&'static str),

    /// The context model was configured with an empty order set.
    #[error("context model requires at least one order")]
    EmptyConfiguration,

    /// A decoded value could not be located in the cumulative frequency
    /// table. Indicates a desync between the model and the coder.
    #[error("decoded value outside the cumulative frequency table")]
    InternalInvariant,
}

/// A specialized Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
