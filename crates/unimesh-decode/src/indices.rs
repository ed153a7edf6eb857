//! Index buffer parsing.

use unimesh_types::MeshFields;

use crate::version::{ByteOrder, FormatInfo, Version};

/// Whether the index buffer holds 16-bit indices.
///
/// The stored `m_Use16BitIndices` flag is unreliable from 2017.3 on; there
/// `m_IndexFormat` decides instead, except for 2017.3 final builds of
/// compressed meshes.
#[must_use]
pub fn uses_16bit_indices(fields: &MeshFields, format: FormatInfo) -> bool {
    let version = format.version;
    let index_format_decides = version >= Version::new(2017, 4, 0, 0)
        || ((version.major, version.minor, version.patch) == (2017, 3, 1)
            && format.build_type.is_patch())
        || ((version.major, version.minor) == (2017, 3) && fields.mesh_compression == 0);

    if index_format_decides {
        let use_16bit = fields.index_format.unwrap_or(0) == 0;
        tracing::trace!(use_16bit, "Index width from index format");
        use_16bit
    } else {
        fields.use_16bit_indices != 0
    }
}

/// Parse a raw index buffer into indices.
///
/// A trailing partial index is ignored.
///
/// # Arguments
///
/// * `bytes` - The raw `m_IndexBuffer` bytes.
/// * `use_16bit` - Whether indices are 16 bits wide (32 otherwise).
/// * `byte_order` - Byte order of the source container.
#[must_use]
pub fn read_index_buffer(bytes: &[u8], use_16bit: bool, byte_order: ByteOrder) -> Vec<u32> {
    if use_16bit {
        bytes
            .chunks_exact(2)
            .map(|c| {
                let raw = [c[0], c[1]];
                u32::from(match byte_order {
                    ByteOrder::Little => u16::from_le_bytes(raw),
                    ByteOrder::Big => u16::from_be_bytes(raw),
                })
            })
            .collect()
    } else {
        bytes
            .chunks_exact(4)
            .map(|c| {
                let raw = [c[0], c[1], c[2], c[3]];
                match byte_order {
                    ByteOrder::Little => u32::from_le_bytes(raw),
                    ByteOrder::Big => u32::from_be_bytes(raw),
                }
            })
            .collect()
    }
}
