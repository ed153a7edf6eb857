//! The canonical decoded mesh.

use glam::Mat4;
use unimesh_types::SubMesh;

use crate::error::{DecodeError, DecodeResult};

/// Number of UV slots a mesh carries.
pub const UV_CHANNELS: usize = 8;

/// A flat float attribute with `dimension` components per vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attribute {
    pub dimension: usize,
    pub data: Vec<f32>,
}

impl Attribute {
    #[must_use]
    pub fn new(dimension: usize, data: Vec<f32>) -> Self {
        Self { dimension, data }
    }

    /// Number of whole vertices held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len().checked_div(self.dimension).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Components of vertex `vertex`.
    #[must_use]
    pub fn get(&self, vertex: usize) -> Option<&[f32]> {
        let start = vertex.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    /// Per-vertex component slices.
    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dimension.max(1))
    }
}

/// Up to four bone influences on one vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoneWeights4 {
    pub weights: [f32; 4],
    pub bone_indices: [u32; 4],
}

/// A fully decoded mesh.
///
/// Per-vertex attributes, when present, hold `vertex_count` entries for
/// well-formed input. Indices form a triangle list into those arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub vertex_count: usize,
    pub positions: Option<Attribute>,
    pub normals: Option<Attribute>,
    pub tangents: Option<Attribute>,
    pub colors: Option<Attribute>,
    uvs: [Option<Attribute>; UV_CHANNELS],
    pub skin: Option<Vec<BoneWeights4>>,
    pub bind_poses: Vec<Mat4>,
    pub indices: Vec<u32>,
    /// Submeshes with index counts corrected for the triangle list.
    pub sub_meshes: Vec<SubMesh>,
}

impl Mesh {
    /// An empty mesh with no attributes.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// UV channel `index`, if decoded.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UvChannelOutOfRange`] for `index >= 8`.
    pub fn uv(&self, index: usize) -> DecodeResult<Option<&Attribute>> {
        self.uvs
            .get(index)
            .map(Option::as_ref)
            .ok_or(DecodeError::UvChannelOutOfRange(index))
    }

    /// Replace UV channel `index`.
    ///
    /// Every slot is stored, including 3 to 7. UnityPy's setters for those
    /// slots compare instead of assigning, so it drops UV3 to UV7; this
    /// decoder keeps them.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UvChannelOutOfRange`] for `index >= 8`.
    pub fn set_uv(&mut self, index: usize, attribute: Attribute) -> DecodeResult<()> {
        let slot = self
            .uvs
            .get_mut(index)
            .ok_or(DecodeError::UvChannelOutOfRange(index))?;
        *slot = Some(attribute);
        Ok(())
    }

    /// Decoded UV channels with their slot index.
    pub fn uvs(&self) -> impl Iterator<Item = (usize, &Attribute)> {
        self.uvs
            .iter()
            .enumerate()
            .filter_map(|(index, uv)| uv.as_ref().map(|uv| (index, uv)))
    }

    /// Number of triangles in the index list.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// The skin array, created zeroed for every vertex on first use.
    pub(crate) fn skin_mut(&mut self) -> &mut Vec<BoneWeights4> {
        let vertex_count = self.vertex_count;
        self.skin
            .get_or_insert_with(|| vec![BoneWeights4::default(); vertex_count])
    }
}
