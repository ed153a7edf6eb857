//! Submesh triangulation.
//!
//! Converts each submesh's slice of the index buffer into a triangle list.
//! Strips are de-stripified with alternating winding, quads split into two
//! triangles. Line and point topologies have no triangle form.

use unimesh_types::SubMesh;

use crate::error::{DecodeError, DecodeResult};
use crate::version::Version;

/// Primitive assembly rule of a submesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    TriangleStrip,
    Quads,
    Lines,
    LineStrip,
    Points,
}

impl TryFrom<u32> for Topology {
    type Error = DecodeError;

    fn try_from(value: u32) -> DecodeResult<Self> {
        Ok(match value {
            0 => Self::Triangles,
            1 => Self::TriangleStrip,
            2 => Self::Quads,
            3 => Self::Lines,
            4 => Self::LineStrip,
            5 => Self::Points,
            other => return Err(DecodeError::UnsupportedTopology(other)),
        })
    }
}

/// Triangle list of a whole mesh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Triangulation {
    pub indices: Vec<u32>,
    /// The input submeshes with `index_count` set to the triangle-list count.
    pub sub_meshes: Vec<SubMesh>,
}

/// Triangulate every submesh of a mesh.
///
/// # Arguments
///
/// * `index_buffer` - Parsed indices, 16 or 32 bit.
/// * `sub_meshes` - Submesh descriptors; `first_byte` is a byte offset into
///   the original buffer.
/// * `use_16bit` - Width of the original indices.
/// * `version` - Before 4.0 every submesh is a strip, whatever its tag.
///
/// # Errors
///
/// Returns [`DecodeError::UnsupportedTopology`] for lines, line strips,
/// points and unknown tags from 4.0 on.
pub fn triangulate(
    index_buffer: &[u32],
    sub_meshes: &[SubMesh],
    use_16bit: bool,
    version: Version,
) -> DecodeResult<Triangulation> {
    let mut indices = Vec::with_capacity(index_buffer.len());
    let mut corrected = Vec::with_capacity(sub_meshes.len());

    for sub_mesh in sub_meshes {
        let mut first = sub_mesh.first_byte as usize / 2;
        if !use_16bit {
            first /= 2;
        }
        let count = sub_mesh.index_count as usize;
        let slice = index_buffer
            .get(first..)
            .map_or(&[][..], |rest| &rest[..count.min(rest.len())]);
        if slice.len() < count {
            tracing::debug!(
                first,
                count,
                available = slice.len(),
                "Submesh runs past the index buffer"
            );
        }

        // Before 4.0 submeshes carried no topology tag and were always strips.
        let emitted = if version.major < 4 {
            destripify(slice, &mut indices)
        } else {
            match Topology::try_from(sub_mesh.topology)? {
                Topology::Triangles => {
                    let whole = slice.len() - slice.len() % 3;
                    indices.extend_from_slice(&slice[..whole]);
                    sub_mesh.index_count as usize
                }
                Topology::TriangleStrip => destripify(slice, &mut indices),
                Topology::Quads => {
                    for quad in slice.chunks_exact(4) {
                        indices.extend_from_slice(&[
                            quad[0], quad[1], quad[2], quad[0], quad[2], quad[3],
                        ]);
                    }
                    count / 2 * 3
                }
                Topology::Lines | Topology::LineStrip | Topology::Points => {
                    return Err(DecodeError::UnsupportedTopology(sub_mesh.topology));
                }
            }
        };

        corrected.push(SubMesh {
            index_count: u32::try_from(emitted).unwrap_or(u32::MAX),
            ..*sub_mesh
        });
    }

    Ok(Triangulation {
        indices,
        sub_meshes: corrected,
    })
}

/// Append the triangles of a strip, flipping winding on odd windows and
/// skipping degenerates. Returns the number of indices appended.
fn destripify(strip: &[u32], out: &mut Vec<u32>) -> usize {
    let before = out.len();
    for (i, window) in strip.windows(3).enumerate() {
        let (a, b, c) = (window[0], window[1], window[2]);
        if a == b || a == c || b == c {
            continue;
        }
        if i & 1 == 1 {
            out.extend_from_slice(&[b, a, c]);
        } else {
            out.extend_from_slice(&[a, b, c]);
        }
    }
    out.len() - before
}
