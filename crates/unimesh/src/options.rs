//! Decoder configuration.

use serde::{Deserialize, Serialize};
use unimesh_decode::{ReferenceUnpacker, Unpacker, WordUnpacker};

/// Which packed-vector implementation to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnpackerKind {
    /// The byte/bit cursor.
    #[default]
    Reference,
    /// The 64-bit window reader.
    Word,
}

impl UnpackerKind {
    #[must_use]
    pub fn unpacker(self) -> &'static dyn Unpacker {
        match self {
            Self::Reference => &ReferenceUnpacker,
            Self::Word => &WordUnpacker,
        }
    }
}

/// Options for [`crate::Decoder`].
///
/// Deserializes from a partial object; missing fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderOptions {
    pub unpacker: UnpackerKind,
    /// Decode the compressed mesh when present.
    pub decompress: bool,
    /// Turn submeshes into triangle lists.
    pub triangulate: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            unpacker: UnpackerKind::Reference,
            decompress: true,
            triangulate: true,
        }
    }
}
