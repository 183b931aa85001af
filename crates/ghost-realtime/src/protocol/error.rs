//! Frame codec errors

use thiserror::Error;

/// Frame encode/decode error
#[derive(Debug, Error)]
pub enum CodecError {
    /// Inbound text is not a frame we understand the shape of
    #[error("Malformed frame: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Outbound frame could not be serialized
    #[error("Failed to encode frame: {0}")]
    Encode(#[source] serde_json::Error),
}
