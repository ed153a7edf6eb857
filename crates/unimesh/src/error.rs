//! Error types.

use thiserror::Error;
use unimesh_decode::{DecodeError, ParseVersionError};

/// Errors from decoding a mesh dump.
#[derive(Debug, Error)]
pub enum Error {
    /// The dump is not valid JSON or does not match the mesh field layout.
    #[error("invalid mesh dump: {0}")]
    Json(#[from] serde_json::Error),

    /// The version string or byte order marker could not be parsed.
    #[error(transparent)]
    Version(#[from] ParseVersionError),

    /// The mesh fields could not be decoded.
    #[error("failed to decode mesh: {0}")]
    Decode(#[from] DecodeError),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
