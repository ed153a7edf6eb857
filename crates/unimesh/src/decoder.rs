//! Configured mesh decoding with structured logging.

use serde::{Deserialize, Serialize};
use unimesh_decode::{ByteOrder, EngineVersion, FormatInfo, Mesh, MeshAssembler};
use unimesh_types::MeshFields;

use crate::error::Result;
use crate::options::DecoderOptions;

/// A mesh object dump: the type-tree fields plus the source metadata every
/// decode needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshDump {
    /// Engine version string, e.g. `2019.4.1f1`.
    pub version: String,
    /// `"<"` for little-endian sources, `">"` for big-endian.
    #[serde(default = "little_endian_marker")]
    pub byte_order: String,
    pub mesh: MeshFields,
}

fn little_endian_marker() -> String {
    "<".to_owned()
}

/// Parse a version string and byte order marker into decode metadata.
///
/// # Errors
///
/// Returns an error if either string is malformed.
pub fn format_info(version: &str, byte_order: &str) -> Result<FormatInfo> {
    let engine: EngineVersion = version.parse()?;
    let byte_order: ByteOrder = byte_order.parse()?;
    Ok(FormatInfo::new(engine.version, byte_order).with_build_type(engine.build_type))
}

/// Decodes meshes with a fixed set of [`DecoderOptions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    options: DecoderOptions,
}

impl Decoder {
    #[must_use]
    pub fn new(options: DecoderOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> DecoderOptions {
        self.options
    }

    /// Decode mesh fields from a source described by `format`.
    ///
    /// # Errors
    ///
    /// Returns an error if the fields use a vertex format or topology that
    /// cannot be decoded.
    pub fn decode(&self, fields: &MeshFields, format: FormatInfo) -> Result<Mesh> {
        let span = tracing::debug_span!(
            "decode_mesh",
            name = %fields.name,
            version = %format.version,
            byte_order = ?format.byte_order,
        );
        let _enter = span.enter();

        let mesh = MeshAssembler::new(format)
            .with_unpacker(self.options.unpacker.unpacker())
            .with_decompression(self.options.decompress)
            .with_triangulation(self.options.triangulate)
            .assemble(fields)?;

        tracing::debug!(
            vertex_count = mesh.vertex_count,
            triangles = mesh.triangle_count(),
            sub_meshes = mesh.sub_meshes.len(),
            uv_channels = mesh.uvs().count(),
            skinned = mesh.skin.is_some(),
            "Decoded mesh"
        );
        Ok(mesh)
    }

    /// Decode mesh fields given the source's version string and byte order
    /// marker.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata is malformed or decoding fails.
    pub fn decode_with_version(
        &self,
        fields: &MeshFields,
        version: &str,
        byte_order: &str,
    ) -> Result<Mesh> {
        self.decode(fields, format_info(version, byte_order)?)
    }

    /// Decode a parsed [`MeshDump`].
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata is malformed or decoding fails.
    pub fn decode_dump(&self, dump: &MeshDump) -> Result<Mesh> {
        self.decode_with_version(&dump.mesh, &dump.version, &dump.byte_order)
    }

    /// Decode a JSON [`MeshDump`].
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a mesh dump, the
    /// metadata is malformed, or decoding fails.
    pub fn decode_json(&self, json: &str) -> Result<Mesh> {
        let dump: MeshDump = serde_json::from_str(json)?;
        self.decode_dump(&dump)
    }
}
