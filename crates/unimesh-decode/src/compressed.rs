//! Compressed mesh decoding.
//!
//! Every stream of a [`CompressedMesh`] is a [`PackedBitVector`]. Each
//! decoder here handles one stream and returns owned arrays; the
//! [`decode_compressed`] entry point runs them all and collects whatever
//! was present into a [`DecodedCompressed`].

use glam::{Mat4, Vec3};
use unimesh_types::{CompressedMesh, PackedBitVector};

use crate::mesh::{Attribute, BoneWeights4, UV_CHANNELS};
use crate::packed::{ChunkLayout, Unpacker};
use crate::version::Version;

/// Quantization steps of one skin weight. A vertex's weights sum to this.
pub const SKIN_WEIGHT_STEPS: u32 = 31;

const UV_INFO_BITS: u32 = 4;
const UV_DIMENSION_MASK: u32 = 3;
const UV_CHANNEL_EXISTS: u32 = 4;

/// Normals shorter than this after dropping z normalize to zero.
const NORMALIZE_EPSILON: f32 = 1e-5;

/// Streams decoded from a compressed mesh. `None` means the stream was
/// empty and should not override vertex data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedCompressed {
    pub vertex_count: Option<usize>,
    pub positions: Option<Attribute>,
    pub uvs: [Option<Attribute>; UV_CHANNELS],
    pub bind_poses: Vec<Mat4>,
    pub normals: Option<Attribute>,
    pub tangents: Option<Attribute>,
    pub colors: Option<Attribute>,
    pub skin: Option<Vec<BoneWeights4>>,
    pub indices: Option<Vec<u32>>,
}

/// Decode every non-empty stream of `mesh`.
///
/// `vertex_count` is used when the mesh has no packed positions.
#[must_use]
pub fn decode_compressed(
    mesh: &CompressedMesh,
    vertex_count: usize,
    version: Version,
    unpacker: &dyn Unpacker,
) -> DecodedCompressed {
    let mut decoded = DecodedCompressed::default();

    let vertex_count = if mesh.vertices.is_empty() {
        vertex_count
    } else {
        let (count, positions) = decode_positions(&mesh.vertices, unpacker);
        decoded.vertex_count = Some(count);
        decoded.positions = Some(positions);
        count
    };

    if !mesh.uv.is_empty() {
        decoded.uvs = decode_uvs(&mesh.uv, mesh.uv_info, vertex_count, unpacker);
    }

    let legacy = version.major < 5;
    if let Some(bind_poses) = mesh.bind_poses.as_ref().filter(|v| legacy && !v.is_empty()) {
        decoded.bind_poses = decode_bind_poses(bind_poses, unpacker);
    }

    if !mesh.normals.is_empty() {
        decoded.normals = Some(decode_normals(&mesh.normals, &mesh.normal_signs, unpacker));
    }
    if !mesh.tangents.is_empty() {
        decoded.tangents = Some(decode_tangents(
            &mesh.tangents,
            &mesh.tangent_signs,
            unpacker,
        ));
    }

    if let Some(colors) = mesh.float_colors.as_ref().filter(|v| !legacy && !v.is_empty()) {
        decoded.colors = Some(decode_float_colors(colors, unpacker));
    }

    if !mesh.weights.is_empty() {
        decoded.skin = Some(decode_skin(
            &mesh.weights,
            &mesh.bone_indices,
            vertex_count,
            unpacker,
        ));
    }

    if !mesh.triangles.is_empty() {
        decoded.indices = Some(unpacker.unpack_ints(&mesh.triangles));
    }

    if let Some(colors) = mesh.colors.as_ref().filter(|v| !v.is_empty()) {
        decoded.colors = Some(decode_byte_colors(colors, unpacker));
    }

    tracing::trace!(
        vertex_count,
        uv_channels = decoded.uvs.iter().flatten().count(),
        skinned = decoded.skin.is_some(),
        "Decoded compressed mesh"
    );
    decoded
}

/// Positions as 3-wide chunks. Returns the vertex count with them.
#[must_use]
pub fn decode_positions(vertices: &PackedBitVector, unpacker: &dyn Unpacker) -> (usize, Attribute) {
    let vertex_count = vertices.num_items as usize / 3;
    let data = unpacker.unpack_floats(vertices, ChunkLayout::packed(3));
    (vertex_count, Attribute::new(3, data))
}

/// UV channels described by `uv_info`.
///
/// Each channel takes four bits of `uv_info`: bit 2 marks it present and
/// bits 0..2 hold its dimension minus one. Channels are stored one after
/// another. With `uv_info == 0` the vector holds UV0 and, when long enough,
/// UV1, both 2D.
#[must_use]
pub fn decode_uvs(
    uv: &PackedBitVector,
    uv_info: u32,
    vertex_count: usize,
    unpacker: &dyn Unpacker,
) -> [Option<Attribute>; UV_CHANNELS] {
    let mut uvs: [Option<Attribute>; UV_CHANNELS] = Default::default();

    if uv_info == 0 {
        let read = |start| unpacker.unpack_floats(uv, ChunkLayout::packed(2).range(start, vertex_count));
        uvs[0] = Some(Attribute::new(2, read(0)));
        if uv.num_items as usize >= vertex_count * 4 {
            uvs[1] = Some(Attribute::new(2, read(vertex_count * 2)));
        }
        return uvs;
    }

    let mut offset = 0;
    for (channel, slot) in uvs.iter_mut().enumerate() {
        let bits = (uv_info >> (channel as u32 * UV_INFO_BITS)) & ((1 << UV_INFO_BITS) - 1);
        if bits & UV_CHANNEL_EXISTS == 0 {
            continue;
        }
        let dimension = 1 + (bits & UV_DIMENSION_MASK) as usize;
        let data = unpacker.unpack_floats(uv, ChunkLayout::packed(dimension).range(offset, vertex_count));
        *slot = Some(Attribute::new(dimension, data));
        offset += dimension * vertex_count;
    }
    uvs
}

/// Bind poses as 16-float chunks, column by column.
#[must_use]
pub fn decode_bind_poses(bind_poses: &PackedBitVector, unpacker: &dyn Unpacker) -> Vec<Mat4> {
    unpacker
        .unpack_floats(bind_poses, ChunkLayout::packed(16))
        .chunks_exact(16)
        .map(Mat4::from_cols_slice)
        .collect()
}

/// Normals stored as `(x, y)` pairs plus one sign per normal for z.
#[must_use]
pub fn decode_normals(
    normals: &PackedBitVector,
    signs: &PackedBitVector,
    unpacker: &dyn Unpacker,
) -> Attribute {
    let pairs = unpacker.unpack_floats(normals, ChunkLayout::packed(2));
    let signs = unpacker.unpack_ints(signs);

    let mut data = Vec::with_capacity(pairs.len() / 2 * 3);
    for (i, pair) in pairs.chunks_exact(2).enumerate() {
        let mut normal = reconstruct_unit(pair[0], pair[1]);
        if sign_entry(&signs, i) == 0 {
            normal.z = -normal.z;
        }
        data.extend_from_slice(&normal.to_array());
    }
    Attribute::new(3, data)
}

/// Tangents stored as `(x, y)` pairs plus two signs per tangent: one for z
/// and one for the handedness in w.
#[must_use]
pub fn decode_tangents(
    tangents: &PackedBitVector,
    signs: &PackedBitVector,
    unpacker: &dyn Unpacker,
) -> Attribute {
    let pairs = unpacker.unpack_floats(tangents, ChunkLayout::packed(2));
    let signs = unpacker.unpack_ints(signs);

    let mut data = Vec::with_capacity(pairs.len() / 2 * 4);
    for (i, pair) in pairs.chunks_exact(2).enumerate() {
        let mut tangent = reconstruct_unit(pair[0], pair[1]);
        if sign_entry(&signs, i * 2) == 0 {
            tangent.z = -tangent.z;
        }
        let w = if sign_entry(&signs, i * 2 + 1) > 0 { 1.0 } else { -1.0 };
        data.extend_from_slice(&tangent.extend(w).to_array());
    }
    Attribute::new(4, data)
}

/// RGBA float colors, one packed float per component.
#[must_use]
pub fn decode_float_colors(colors: &PackedBitVector, unpacker: &dyn Unpacker) -> Attribute {
    Attribute::new(4, unpacker.unpack_floats(colors, ChunkLayout::new(1, 4)))
}

/// RGBA byte colors.
///
/// The stored vector counts whole colors; it is read as four times as many
/// items of a quarter of the width.
#[must_use]
pub fn decode_byte_colors(colors: &PackedBitVector, unpacker: &dyn Unpacker) -> Attribute {
    let components = PackedBitVector {
        num_items: colors.num_items.saturating_mul(4),
        bit_size: colors.bit_size / 4,
        ..colors.clone()
    };
    let data = unpacker
        .unpack_ints(&components)
        .into_iter()
        .map(|c| c as f32 / 255.0)
        .collect();
    Attribute::new(4, data)
}

/// Skin weights and bone indices for `vertex_count` vertices.
///
/// Weights are quantized to [`SKIN_WEIGHT_STEPS`] and only stored until a
/// vertex's total is reached. A vertex with three stored weights below the
/// total gets a fourth weight making up the rest, with its own bone index.
#[must_use]
pub fn decode_skin(
    weights: &PackedBitVector,
    bone_indices: &PackedBitVector,
    vertex_count: usize,
    unpacker: &dyn Unpacker,
) -> Vec<BoneWeights4> {
    let weights = unpacker.unpack_ints(weights);
    let mut bones = unpacker.unpack_ints(bone_indices).into_iter();

    let mut skin = vec![BoneWeights4::default(); vertex_count];
    let mut state = SkinState::default();
    for weight in weights {
        state.consume(&mut skin, weight, &mut bones);
    }
    if state.overflowed > 0 {
        tracing::debug!(
            dropped = state.overflowed,
            vertex_count,
            "Skin weights run past the last vertex"
        );
    }
    skin
}

/// Position in the weight stream: current vertex, next slot, and the
/// quantized total read so far for that vertex.
#[derive(Debug, Default)]
struct SkinState {
    vertex: usize,
    slot: usize,
    sum: u32,
    overflowed: usize,
}

impl SkinState {
    fn consume(
        &mut self,
        skin: &mut [BoneWeights4],
        weight: u32,
        bones: &mut impl Iterator<Item = u32>,
    ) {
        let bone = bones.next().unwrap_or(0);
        self.write(skin, weight as f32 / SKIN_WEIGHT_STEPS as f32, bone);
        self.slot += 1;
        self.sum = self.sum.saturating_add(weight);

        if self.sum >= SKIN_WEIGHT_STEPS {
            // Complete. Remaining slots stay zero.
            while self.slot < 4 {
                self.write(skin, 0.0, 0);
                self.slot += 1;
            }
            self.next_vertex();
        } else if self.slot == 3 {
            let rest = (SKIN_WEIGHT_STEPS - self.sum) as f32 / SKIN_WEIGHT_STEPS as f32;
            let bone = bones.next().unwrap_or(0);
            self.write(skin, rest, bone);
            self.next_vertex();
        }
    }

    fn write(&mut self, skin: &mut [BoneWeights4], weight: f32, bone: u32) {
        if let Some(entry) = skin.get_mut(self.vertex) {
            entry.weights[self.slot] = weight;
            entry.bone_indices[self.slot] = bone;
        } else {
            self.overflowed += 1;
        }
    }

    fn next_vertex(&mut self) {
        self.vertex += 1;
        self.slot = 0;
        self.sum = 0;
    }
}

/// Rebuild a unit vector from x and y, z non-negative.
fn reconstruct_unit(x: f32, y: f32) -> Vec3 {
    let z_squared = 1.0 - x * x - y * y;
    if z_squared >= 0.0 {
        return Vec3::new(x, y, z_squared.sqrt());
    }
    let flat = Vec3::new(x, y, 0.0);
    let length = flat.length();
    if length > NORMALIZE_EPSILON {
        flat / length
    } else {
        Vec3::ZERO
    }
}

/// Sign entry `index`, reading missing entries as 1.
fn sign_entry(signs: &[u32], index: usize) -> u32 {
    signs.get(index).copied().unwrap_or(1)
}
