//! Decode mesh geometry from serialized Unity `Mesh` objects.
//!
//! This crate turns the raw field values of a mesh object (as supplied by a
//! type-tree reader, see `unimesh-types`) into a canonical [`Mesh`]: flat
//! position, normal, tangent, color and UV arrays, skin weights, bind poses
//! and a triangle list. All functions are pure and synchronous; the caller
//! decides how to parallelize across meshes.
//!
//! # Design principles
//!
//! - **Version driven**: every layout and format decision is keyed on the
//!   source [`Version`], through static per-era tables
//! - **Tolerant**: truncated buffers and degenerate packed vectors decode to
//!   zero or sentinel values instead of failing
//! - **Swappable inner loop**: packed vectors are read through the
//!   [`Unpacker`] trait
//!
//! # Key functions
//!
//! - [`decode_mesh`]: Decode a whole mesh with default settings
//! - [`MeshAssembler`]: Configure unpacker, decompression and triangulation
//! - [`unpack_floats`], [`unpack_ints`], [`unpack_quats`]: Packed vector profiles
//! - [`resolve_layout`]: Channel and stream layout of a vertex buffer
//! - [`extract_channels`]: Per-channel component arrays from a vertex buffer
//! - [`decode_compressed`]: Streams of a compressed mesh
//! - [`triangulate`]: Triangle lists from strips, quads and lists

mod error;

pub mod assemble;
pub mod bits;
pub mod channels;
pub mod compressed;
pub mod format;
pub mod indices;
pub mod layout;
pub mod mesh;
pub mod packed;
pub mod triangles;
pub mod version;

pub use assemble::{MeshAssembler, decode_mesh};
pub use channels::{ChannelData, ExtractedChannel, extract_channels};
pub use compressed::{DecodedCompressed, decode_compressed};
pub use error::{DecodeError, DecodeResult};
pub use format::{ChannelSemantic, FormatEra, VertexFormat, channel_semantic};
pub use indices::{read_index_buffer, uses_16bit_indices};
pub use layout::{VertexChannel, VertexLayout, VertexStream, resolve_layout};
pub use mesh::{Attribute, BoneWeights4, Mesh, UV_CHANNELS};
pub use packed::{
    ChunkLayout, ReferenceUnpacker, Unpacker, WordUnpacker, unpack_floats, unpack_ints,
    unpack_quats,
};
pub use triangles::{Topology, Triangulation, triangulate};
pub use version::{BuildType, ByteOrder, EngineVersion, FormatInfo, ParseVersionError, Version};
