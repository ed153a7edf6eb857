//! Wire-shape field types for serialized Unity `Mesh` objects.
//!
//! These structs mirror the field layout produced by the type-tree reader
//! that walks an asset container. They carry raw values only: bytes, counts,
//! integer format tags. All interpretation happens in `unimesh-decode`.
//!
//! Field names follow the container's own naming (`m_NumItems`,
//! `channelMask`, ...) through `serde` renames, so a JSON dump of a mesh
//! object's type tree deserializes directly into [`MeshFields`].

use serde::{Deserialize, Serialize};

/// A run of bit-packed numbers.
///
/// Integer-only vectors (`m_Weights`, `m_Triangles`, ...) have no range or
/// start in the container; they deserialize with both set to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackedBitVector {
    #[serde(rename = "m_NumItems")]
    pub num_items: u32,
    #[serde(rename = "m_Range")]
    pub range: f32,
    #[serde(rename = "m_Start")]
    pub start: f32,
    #[serde(rename = "m_Data")]
    pub data: Vec<u8>,
    #[serde(rename = "m_BitSize")]
    pub bit_size: u8,
}

impl PackedBitVector {
    /// An integer vector of `num_items` values, `bit_size` bits each.
    #[must_use]
    pub fn ints(num_items: u32, bit_size: u8, data: Vec<u8>) -> Self {
        Self {
            num_items,
            bit_size,
            data,
            ..Self::default()
        }
    }

    /// A quantized float vector covering `[start, start + range]`.
    #[must_use]
    pub fn floats(num_items: u32, bit_size: u8, range: f32, start: f32, data: Vec<u8>) -> Self {
        Self {
            num_items,
            range,
            start,
            data,
            bit_size,
        }
    }

    /// Whether the vector holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_items == 0
    }
}

/// One vertex attribute descriptor inside [`VertexData`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelInfo {
    pub stream: u8,
    pub offset: u8,
    pub format: u8,
    pub dimension: u8,
}

/// One interleaved stream descriptor inside [`VertexData`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamInfo {
    #[serde(rename = "channelMask")]
    pub channel_mask: u32,
    pub offset: u32,
    pub stride: u32,
}

/// Raw interleaved vertex buffer plus its layout descriptors.
///
/// Containers written before 4.0 store exactly four streams as separate
/// fields (`m_Streams[0]` .. `m_Streams[3]`) instead of an array; both
/// shapes are accepted and merged by [`VertexData::stream_infos`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VertexData {
    #[serde(rename = "m_CurrentChannels")]
    pub current_channels: Option<u32>,
    #[serde(rename = "m_VertexCount")]
    pub vertex_count: u32,
    #[serde(rename = "m_Channels")]
    pub channels: Vec<ChannelInfo>,
    #[serde(rename = "m_Streams")]
    pub streams: Vec<StreamInfo>,
    #[serde(rename = "m_Streams_0_", skip_serializing_if = "Option::is_none")]
    pub streams_0: Option<StreamInfo>,
    #[serde(rename = "m_Streams_1_", skip_serializing_if = "Option::is_none")]
    pub streams_1: Option<StreamInfo>,
    #[serde(rename = "m_Streams_2_", skip_serializing_if = "Option::is_none")]
    pub streams_2: Option<StreamInfo>,
    #[serde(rename = "m_Streams_3_", skip_serializing_if = "Option::is_none")]
    pub streams_3: Option<StreamInfo>,
    #[serde(rename = "m_DataSize")]
    pub data: Vec<u8>,
}

impl VertexData {
    /// The stream descriptors, whichever field shape the container used.
    #[must_use]
    pub fn stream_infos(&self) -> Vec<StreamInfo> {
        if !self.streams.is_empty() {
            return self.streams.clone();
        }
        // Missing fields keep their slot so stream indices stay aligned.
        let split = [self.streams_0, self.streams_1, self.streams_2, self.streams_3];
        let used = split.iter().rposition(Option::is_some).map_or(0, |last| last + 1);
        split[..used]
            .iter()
            .map(|stream| stream.unwrap_or_default())
            .collect()
    }
}

/// The fully bit-packed mesh representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressedMesh {
    #[serde(rename = "m_Vertices")]
    pub vertices: PackedBitVector,
    #[serde(rename = "m_UV")]
    pub uv: PackedBitVector,
    /// Only present before 5.0.
    #[serde(rename = "m_BindPoses")]
    pub bind_poses: Option<PackedBitVector>,
    #[serde(rename = "m_Normals")]
    pub normals: PackedBitVector,
    #[serde(rename = "m_Tangents")]
    pub tangents: PackedBitVector,
    #[serde(rename = "m_Weights")]
    pub weights: PackedBitVector,
    #[serde(rename = "m_NormalSigns")]
    pub normal_signs: PackedBitVector,
    #[serde(rename = "m_TangentSigns")]
    pub tangent_signs: PackedBitVector,
    /// Only present from 5.0.
    #[serde(rename = "m_FloatColors")]
    pub float_colors: Option<PackedBitVector>,
    #[serde(rename = "m_BoneIndices")]
    pub bone_indices: PackedBitVector,
    #[serde(rename = "m_Triangles")]
    pub triangles: PackedBitVector,
    /// Byte colors, only present before 5.0.
    #[serde(rename = "m_Colors")]
    pub colors: Option<PackedBitVector>,
    #[serde(rename = "m_UVInfo")]
    pub uv_info: u32,
}

/// One draw call's slice of the index buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubMesh {
    #[serde(rename = "firstByte")]
    pub first_byte: u32,
    #[serde(rename = "indexCount")]
    pub index_count: u32,
    /// Raw primitive type tag (0 triangles, 1 strip, 2 quads, 3 lines,
    /// 4 line strip, 5 points).
    pub topology: u32,
    #[serde(rename = "firstVertex")]
    pub first_vertex: u32,
    #[serde(rename = "vertexCount")]
    pub vertex_count: u32,
}

/// The `Mesh` object fields the decoder consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshFields {
    #[serde(rename = "m_Name")]
    pub name: String,
    #[serde(rename = "m_SubMeshes")]
    pub sub_meshes: Vec<SubMesh>,
    /// Stored 16-bit flag; unreliable from 2017.3.1p1 on.
    #[serde(rename = "m_Use16BitIndices")]
    pub use_16bit_indices: u32,
    /// 0 for 16-bit indices, 1 for 32-bit (2017.3 and later).
    #[serde(rename = "m_IndexFormat")]
    pub index_format: Option<u32>,
    #[serde(rename = "m_MeshCompression")]
    pub mesh_compression: u8,
    #[serde(rename = "m_IndexBuffer")]
    pub index_buffer: Vec<u8>,
    #[serde(rename = "m_VertexData")]
    pub vertex_data: Option<VertexData>,
    #[serde(rename = "m_CompressedMesh")]
    pub compressed_mesh: Option<CompressedMesh>,
}

impl Default for MeshFields {
    fn default() -> Self {
        Self {
            name: String::new(),
            sub_meshes: Vec::new(),
            use_16bit_indices: 1,
            index_format: None,
            mesh_compression: 0,
            index_buffer: Vec::new(),
            vertex_data: None,
            compressed_mesh: None,
        }
    }
}
