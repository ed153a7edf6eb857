//! Decode errors.

use thiserror::Error;

/// Errors that stop a mesh from decoding.
///
/// Degenerate packed streams (zero range, zero bit width) and truncated
/// buffers are not errors: they decode to sentinel or zero values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A vertex format tag that the mesh's format era does not define.
    #[error("unsupported vertex format {format} for version {version}")]
    UnsupportedVertexFormat { format: u8, version: String },

    /// A submesh topology that cannot be turned into triangles.
    #[error("unsupported submesh topology {0}: only triangles, strips and quads can be triangulated")]
    UnsupportedTopology(u32),

    /// A UV channel index outside the eight available slots.
    #[error("uv channel {0} out of range (0..8)")]
    UvChannelOutOfRange(usize),
}

impl DecodeError {
    /// Whether this error is one of the unsupported-format kinds.
    #[must_use]
    pub fn is_unsupported_format(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedVertexFormat { .. } | Self::UnsupportedTopology(_)
        )
    }
}

/// Result alias used throughout the crate.
pub type DecodeResult<T> = Result<T, DecodeError>;
