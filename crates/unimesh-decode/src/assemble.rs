//! Whole-mesh assembly.
//!
//! Runs the decoding stages in the order the source version calls for:
//!
//! 1. Parse the index buffer at the width chosen by [`uses_16bit_indices`].
//! 2. From 3.5, extract the interleaved vertex data.
//! 3. From 2.6, decode the compressed mesh; its non-empty streams replace
//!    what the vertex data produced.
//! 4. Triangulate every submesh.

use unimesh_types::{MeshFields, VertexData};

use crate::channels::{ExtractedChannel, extract_channels};
use crate::compressed::{DecodedCompressed, decode_compressed};
use crate::error::DecodeResult;
use crate::format::{ChannelSemantic, channel_semantic};
use crate::indices::{read_index_buffer, uses_16bit_indices};
use crate::layout::resolve_layout;
use crate::mesh::{Attribute, Mesh};
use crate::packed::{ReferenceUnpacker, Unpacker};
use crate::triangles::triangulate;
use crate::version::{FormatInfo, Version};

/// First version with an interleaved vertex buffer.
const VERTEX_DATA_SINCE: Version = Version::new(3, 5, 0, 0);

/// First version with a compressed mesh.
const COMPRESSED_MESH_SINCE: Version = Version::new(2, 6, 0, 0);

/// Decodes [`MeshFields`] into a [`Mesh`].
#[derive(Clone, Copy)]
pub struct MeshAssembler<'a> {
    format: FormatInfo,
    unpacker: &'a dyn Unpacker,
    decompress: bool,
    triangulate: bool,
}

impl std::fmt::Debug for MeshAssembler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshAssembler")
            .field("format", &self.format)
            .field("decompress", &self.decompress)
            .field("triangulate", &self.triangulate)
            .finish_non_exhaustive()
    }
}

impl MeshAssembler<'static> {
    /// An assembler using the reference unpacker, with every stage enabled.
    #[must_use]
    pub fn new(format: FormatInfo) -> Self {
        Self {
            format,
            unpacker: &ReferenceUnpacker,
            decompress: true,
            triangulate: true,
        }
    }
}

impl MeshAssembler<'_> {
    /// Use `unpacker` for every packed vector.
    #[must_use]
    pub fn with_unpacker<'b>(self, unpacker: &'b dyn Unpacker) -> MeshAssembler<'b> {
        MeshAssembler {
            format: self.format,
            unpacker,
            decompress: self.decompress,
            triangulate: self.triangulate,
        }
    }

    /// Whether to decode the compressed mesh.
    #[must_use]
    pub fn with_decompression(mut self, decompress: bool) -> Self {
        self.decompress = decompress;
        self
    }

    /// Whether to triangulate submeshes. When disabled the parsed index
    /// buffer and the submeshes are passed through unchanged.
    #[must_use]
    pub fn with_triangulation(mut self, triangulate: bool) -> Self {
        self.triangulate = triangulate;
        self
    }

    #[must_use]
    pub fn format(&self) -> FormatInfo {
        self.format
    }

    /// Decode one mesh.
    ///
    /// # Errors
    ///
    /// Fails on a vertex format the version does not define, or a submesh
    /// topology with no triangle form.
    pub fn assemble(&self, fields: &MeshFields) -> DecodeResult<Mesh> {
        let version = self.format.version;
        let use_16bit = uses_16bit_indices(fields, self.format);
        let mut index_buffer =
            read_index_buffer(&fields.index_buffer, use_16bit, self.format.byte_order);

        let mut mesh = Mesh::named(fields.name.clone());

        let vertex_data = fields
            .vertex_data
            .as_ref()
            .filter(|_| version >= VERTEX_DATA_SINCE);
        if let Some(vertex_data) = vertex_data {
            self.read_vertex_data(vertex_data, &mut mesh)?;
        }

        let compressed = fields
            .compressed_mesh
            .as_ref()
            .filter(|_| self.decompress && version >= COMPRESSED_MESH_SINCE);
        if let Some(compressed) = compressed {
            let decoded = decode_compressed(compressed, mesh.vertex_count, version, self.unpacker);
            apply_compressed(decoded, &mut mesh, &mut index_buffer)?;
        }

        if self.triangulate {
            let triangulation = triangulate(&index_buffer, &fields.sub_meshes, use_16bit, version)?;
            mesh.indices = triangulation.indices;
            mesh.sub_meshes = triangulation.sub_meshes;
        } else {
            mesh.indices = index_buffer;
            mesh.sub_meshes.clone_from(&fields.sub_meshes);
        }

        tracing::trace!(
            name = %mesh.name,
            vertex_count = mesh.vertex_count,
            indices = mesh.indices.len(),
            use_16bit,
            "Assembled mesh"
        );
        Ok(mesh)
    }

    fn read_vertex_data(&self, vertex_data: &VertexData, mesh: &mut Mesh) -> DecodeResult<()> {
        let version = self.format.version;
        mesh.vertex_count = vertex_data.vertex_count as usize;

        let layout = resolve_layout(vertex_data, version)?;
        let channels = extract_channels(&layout, &vertex_data.data, mesh.vertex_count, self.format);
        for channel in channels {
            let Some(semantic) = channel_semantic(channel.index, version) else {
                tracing::trace!(channel = channel.index, "Channel slot has no semantic");
                continue;
            };
            assign_channel(mesh, semantic, channel)?;
        }
        Ok(())
    }
}

/// Decode a mesh with the reference unpacker and every stage enabled.
///
/// # Errors
///
/// See [`MeshAssembler::assemble`].
pub fn decode_mesh(fields: &MeshFields, format: FormatInfo) -> DecodeResult<Mesh> {
    MeshAssembler::new(format).assemble(fields)
}

fn assign_channel(
    mesh: &mut Mesh,
    semantic: ChannelSemantic,
    channel: ExtractedChannel,
) -> DecodeResult<()> {
    let dimension = channel.dimension;
    match semantic {
        ChannelSemantic::Position => {
            mesh.positions = Some(Attribute::new(dimension, channel.data.into_floats()));
        }
        ChannelSemantic::Normal => {
            mesh.normals = Some(Attribute::new(dimension, channel.data.into_floats()));
        }
        ChannelSemantic::Tangent => {
            mesh.tangents = Some(Attribute::new(dimension, channel.data.into_floats()));
        }
        ChannelSemantic::Color => {
            mesh.colors = Some(Attribute::new(dimension, channel.data.into_floats()));
        }
        ChannelSemantic::TexCoord(index) => {
            mesh.set_uv(index, Attribute::new(dimension, channel.data.into_floats()))?;
        }
        ChannelSemantic::BlendWeight => {
            let weights = channel.data.into_floats();
            for (entry, values) in mesh.skin_mut().iter_mut().zip(weights.chunks(dimension)) {
                for (slot, &weight) in entry.weights.iter_mut().zip(values) {
                    *slot = weight;
                }
            }
        }
        ChannelSemantic::BlendIndices => {
            let bones = channel.data.into_indices();
            for (entry, values) in mesh.skin_mut().iter_mut().zip(bones.chunks(dimension)) {
                for (slot, &bone) in entry.bone_indices.iter_mut().zip(values) {
                    *slot = bone;
                }
            }
        }
    }
    Ok(())
}

fn apply_compressed(
    decoded: DecodedCompressed,
    mesh: &mut Mesh,
    index_buffer: &mut Vec<u32>,
) -> DecodeResult<()> {
    if let Some(vertex_count) = decoded.vertex_count {
        mesh.vertex_count = vertex_count;
    }
    if decoded.positions.is_some() {
        mesh.positions = decoded.positions;
    }
    for (index, uv) in decoded.uvs.into_iter().enumerate() {
        if let Some(uv) = uv {
            mesh.set_uv(index, uv)?;
        }
    }
    if !decoded.bind_poses.is_empty() {
        mesh.bind_poses = decoded.bind_poses;
    }
    if decoded.normals.is_some() {
        mesh.normals = decoded.normals;
    }
    if decoded.tangents.is_some() {
        mesh.tangents = decoded.tangents;
    }
    if decoded.colors.is_some() {
        mesh.colors = decoded.colors;
    }
    if decoded.skin.is_some() {
        mesh.skin = decoded.skin;
    }
    if let Some(indices) = decoded.indices {
        *index_buffer = indices;
    }
    Ok(())
}
