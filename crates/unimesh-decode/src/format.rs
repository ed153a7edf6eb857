//! Vertex component formats and channel semantics per format era.
//!
//! The integer tags stored in channel descriptors changed meaning twice
//! (2017 and 2019), and the channel slot order changed at 5.0 and 2018.
//! Every mapping lives in a static table here so each era can be checked on
//! its own.

use crate::error::{DecodeError, DecodeResult};
use crate::version::Version;

/// A vertex component format, independent of era.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    Float,
    Float16,
    UNorm8,
    SNorm8,
    UNorm16,
    SNorm16,
    UInt8,
    SInt8,
    UInt16,
    SInt16,
    UInt32,
    SInt32,
}

/// Channel format tags before 2017.
const CHANNEL_FORMATS: [VertexFormat; 5] = [
    VertexFormat::Float,
    VertexFormat::Float16,
    // Color: four bytes per "component", extracted as UNorm8.
    VertexFormat::UNorm8,
    // Byte.
    VertexFormat::UInt8,
    VertexFormat::UInt32,
];

/// Vertex format tags in 2017 and 2018.
const VERTEX_FORMATS_2017: [VertexFormat; 13] = [
    VertexFormat::Float,
    VertexFormat::Float16,
    // Color.
    VertexFormat::UNorm8,
    VertexFormat::UNorm8,
    VertexFormat::SNorm8,
    VertexFormat::UNorm16,
    VertexFormat::SNorm16,
    VertexFormat::UInt8,
    VertexFormat::SInt8,
    VertexFormat::UInt16,
    VertexFormat::SInt16,
    VertexFormat::UInt32,
    VertexFormat::SInt32,
];

/// Vertex format tags from 2019 on.
const VERTEX_FORMATS_2019: [VertexFormat; 12] = [
    VertexFormat::Float,
    VertexFormat::Float16,
    VertexFormat::UNorm8,
    VertexFormat::SNorm8,
    VertexFormat::UNorm16,
    VertexFormat::SNorm16,
    VertexFormat::UInt8,
    VertexFormat::SInt8,
    VertexFormat::UInt16,
    VertexFormat::SInt16,
    VertexFormat::UInt32,
    VertexFormat::SInt32,
];

/// Which format tag table a version uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatEra {
    /// Before 2017: `VertexChannelFormat` tags.
    Channel,
    /// 2017 and 2018.
    Unity2017,
    /// 2019 and later.
    Unity2019,
}

impl FormatEra {
    #[must_use]
    pub fn of(version: Version) -> Self {
        if version.major < 2017 {
            Self::Channel
        } else if version.major < 2019 {
            Self::Unity2017
        } else {
            Self::Unity2019
        }
    }

    fn table(self) -> &'static [VertexFormat] {
        match self {
            Self::Channel => &CHANNEL_FORMATS,
            Self::Unity2017 => &VERTEX_FORMATS_2017,
            Self::Unity2019 => &VERTEX_FORMATS_2019,
        }
    }

    /// Whether a raw tag decodes through the integer path in this era.
    #[must_use]
    pub fn is_integer(self, raw: u8) -> bool {
        match self {
            Self::Channel => raw == 4,
            Self::Unity2017 => raw >= 7,
            Self::Unity2019 => raw >= 6,
        }
    }
}

impl VertexFormat {
    /// Decode a raw format tag for the given version.
    pub fn from_raw(raw: u8, version: Version) -> DecodeResult<Self> {
        FormatEra::of(version)
            .table()
            .get(usize::from(raw))
            .copied()
            .ok_or_else(|| DecodeError::UnsupportedVertexFormat {
                format: raw,
                version: version.to_string(),
            })
    }

    /// Size of one component in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Float | Self::UInt32 | Self::SInt32 => 4,
            Self::Float16 | Self::UNorm16 | Self::SNorm16 | Self::UInt16 | Self::SInt16 => 2,
            Self::UNorm8 | Self::SNorm8 | Self::UInt8 | Self::SInt8 => 1,
        }
    }
}

/// What a vertex channel slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelSemantic {
    Position,
    Normal,
    Tangent,
    Color,
    TexCoord(usize),
    BlendWeight,
    BlendIndices,
}

use ChannelSemantic::{BlendIndices, BlendWeight, Color, Normal, Position, Tangent, TexCoord};

/// Slots from 2018 on.
const CHANNELS_2018: [ChannelSemantic; 14] = [
    Position,
    Normal,
    Tangent,
    Color,
    TexCoord(0),
    TexCoord(1),
    TexCoord(2),
    TexCoord(3),
    TexCoord(4),
    TexCoord(5),
    TexCoord(6),
    TexCoord(7),
    BlendWeight,
    BlendIndices,
];

/// Slots from 5.0 up to 2018.
const CHANNELS_5: [ChannelSemantic; 8] = [
    Position,
    Normal,
    Color,
    TexCoord(0),
    TexCoord(1),
    TexCoord(2),
    TexCoord(3),
    Tangent,
];

/// Slots before 5.0. Slot 5 is the tangent here; slots 6 and 7 keep their
/// 5.x meaning.
const CHANNELS_4: [ChannelSemantic; 8] = [
    Position,
    Normal,
    Color,
    TexCoord(0),
    TexCoord(1),
    Tangent,
    TexCoord(3),
    Tangent,
];

/// The semantic of channel slot `index` for the given version.
#[must_use]
pub fn channel_semantic(index: usize, version: Version) -> Option<ChannelSemantic> {
    let table: &[ChannelSemantic] = if version.major >= 2018 {
        &CHANNELS_2018
    } else if version.major >= 5 {
        &CHANNELS_5
    } else {
        &CHANNELS_4
    };
    table.get(index).copied()
}

/// Raw channel format and dimension of the six implicit slots used before
/// 4.0: position, normal, color, uv0, uv1, tangent.
pub const IMPLICIT_SLOTS: [(u8, u8); 6] = [(0, 3), (0, 3), (2, 4), (0, 2), (0, 2), (0, 4)];

#[cfg(test)]
mod tests {
    use super::*;

    const V4: Version = Version::new(4, 7, 2, 0);
    const V5: Version = Version::new(5, 6, 0, 0);
    const V2017: Version = Version::new(2017, 4, 0, 0);
    const V2018: Version = Version::new(2018, 2, 0, 0);
    const V2019: Version = Version::new(2019, 4, 0, 0);

    #[test]
    fn test_component_sizes() {
        assert_eq!(VertexFormat::Float.size(), 4);
        assert_eq!(VertexFormat::SInt32.size(), 4);
        assert_eq!(VertexFormat::Float16.size(), 2);
        assert_eq!(VertexFormat::SNorm16.size(), 2);
        assert_eq!(VertexFormat::UNorm8.size(), 1);
        assert_eq!(VertexFormat::SInt8.size(), 1);
    }

    #[test]
    fn test_same_tag_differs_by_era() {
        assert_eq!(VertexFormat::from_raw(2, V5).unwrap(), VertexFormat::UNorm8);
        assert_eq!(VertexFormat::from_raw(3, V5).unwrap(), VertexFormat::UInt8);
        assert_eq!(VertexFormat::from_raw(3, V2017).unwrap(), VertexFormat::UNorm8);
        assert_eq!(VertexFormat::from_raw(3, V2019).unwrap(), VertexFormat::SNorm8);
        assert_eq!(VertexFormat::from_raw(11, V2017).unwrap(), VertexFormat::UInt32);
        assert_eq!(VertexFormat::from_raw(11, V2019).unwrap(), VertexFormat::SInt32);
    }

    #[test]
    fn test_unknown_tags_are_unsupported() {
        assert!(VertexFormat::from_raw(5, V5).is_err());
        assert!(VertexFormat::from_raw(13, V2017).is_err());
        let err = VertexFormat::from_raw(12, V2019).unwrap_err();
        assert!(err.is_unsupported_format());
    }

    #[test]
    fn test_integer_tags_by_era() {
        assert!(FormatEra::of(V5).is_integer(4));
        assert!(!FormatEra::of(V5).is_integer(3));
        assert!(!FormatEra::of(V2017).is_integer(6));
        assert!(FormatEra::of(V2017).is_integer(7));
        assert!(FormatEra::of(V2019).is_integer(6));
    }

    #[test]
    fn test_slot_five_by_version() {
        assert_eq!(channel_semantic(5, V4), Some(Tangent));
        assert_eq!(channel_semantic(5, V5), Some(TexCoord(2)));
        assert_eq!(channel_semantic(5, V2018), Some(TexCoord(1)));
    }

    #[test]
    fn test_2018_layout_moves_tangent_and_adds_skin() {
        assert_eq!(channel_semantic(2, V2018), Some(Tangent));
        assert_eq!(channel_semantic(3, V2018), Some(Color));
        assert_eq!(channel_semantic(12, V2018), Some(BlendWeight));
        assert_eq!(channel_semantic(13, V2018), Some(BlendIndices));
        assert_eq!(channel_semantic(14, V2018), None);
        assert_eq!(channel_semantic(8, V5), None);
    }
}
