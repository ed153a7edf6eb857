//! Decode Unity mesh objects from type-tree field dumps.
//!
//! This crate is the entry point over `unimesh-decode`. It parses the source
//! metadata (engine version string, byte order marker), applies a
//! [`DecoderOptions`] configuration, and wraps each decode in a tracing span.
//!
//! # Example
//!
//! ```no_run
//! use unimesh::{Decoder, DecoderOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let json = std::fs::read_to_string("mesh.json")?;
//! let mesh = Decoder::new(DecoderOptions::default()).decode_json(&json)?;
//! println!("{} vertices, {} triangles", mesh.vertex_count, mesh.triangle_count());
//! # Ok(())
//! # }
//! ```

mod decoder;
mod error;
mod options;

pub use decoder::{Decoder, MeshDump, format_info};
pub use error::{Error, Result};
pub use options::{DecoderOptions, UnpackerKind};

// Re-export the decoded types and raw field types.
pub use unimesh_decode::{
    Attribute, BoneWeights4, BuildType, ByteOrder, DecodeError, FormatInfo, Mesh, Version,
};
pub use unimesh_types as types;
