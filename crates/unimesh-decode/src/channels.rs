//! Vertex channel extraction.
//!
//! Pulls each active channel out of the interleaved vertex buffer into its
//! own component array. Components are first gathered into a big-endian
//! byte run (byte-swapping little-endian sources), then converted by format.

use half::f16;

use crate::format::{FormatEra, VertexFormat};
use crate::layout::{VertexChannel, VertexLayout};
use crate::version::{ByteOrder, FormatInfo};

/// Decoded components of one channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelData {
    Float(Vec<f32>),
    Int(Vec<i32>),
}

impl ChannelData {
    /// Components as floats, converting integer data numerically.
    #[must_use]
    pub fn into_floats(self) -> Vec<f32> {
        match self {
            Self::Float(values) => values,
            Self::Int(values) => values.into_iter().map(|v| v as f32).collect(),
        }
    }

    /// Components as non-negative integers. Negative values clamp to zero
    /// and floats truncate.
    #[must_use]
    pub fn into_indices(self) -> Vec<u32> {
        match self {
            Self::Float(values) => values.into_iter().map(|v| v.max(0.0) as u32).collect(),
            Self::Int(values) => values
                .into_iter()
                .map(|v| u32::try_from(v).unwrap_or(0))
                .collect(),
        }
    }
}

/// One extracted channel: `vertex_count * dimension` components.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedChannel {
    pub index: usize,
    pub dimension: usize,
    pub data: ChannelData,
}

/// Extract every active channel of `layout` from `data`.
///
/// Channels whose stream is missing or whose bit is not set in the stream's
/// mask are skipped.
pub fn extract_channels(
    layout: &VertexLayout,
    data: &[u8],
    vertex_count: usize,
    format: FormatInfo,
) -> Vec<ExtractedChannel> {
    let mut extracted = Vec::with_capacity(layout.channels.len());
    for channel in &layout.channels {
        let Some(stream) = layout.streams.get(channel.stream) else {
            tracing::debug!(
                channel = channel.index,
                stream = channel.stream,
                "Skipping channel with missing stream"
            );
            continue;
        };
        if !stream.has_channel(channel.index) {
            continue;
        }

        let dimension = effective_dimension(channel, format);
        let component_size = channel.format.size();
        let swap = format.byte_order == ByteOrder::Little && component_size > 1;

        let base = stream.offset + channel.offset;
        let bytes = gather_components(
            data,
            vertex_count,
            base,
            stream.stride,
            dimension * component_size,
            component_size,
            swap,
        );

        let channel_data = if FormatEra::of(format.version).is_integer(channel.raw_format) {
            ChannelData::Int(parse_ints(&bytes, component_size))
        } else {
            ChannelData::Float(parse_floats(&bytes, channel.format))
        };

        extracted.push(ExtractedChannel {
            index: channel.index,
            dimension,
            data: channel_data,
        });
    }
    extracted
}

/// Before 2018 a color channel stored with the color format counts its four
/// bytes as a single component.
fn effective_dimension(channel: &VertexChannel, format: FormatInfo) -> usize {
    if format.version.major < 2018 && channel.index == 2 && channel.raw_format == 2 {
        4
    } else {
        channel.dimension
    }
}

/// Copy `vertex_bytes` per vertex starting at `base + v * stride` into a
/// contiguous run, reversing each `component_size` group when `swap` is set.
/// Bytes past the end of `data` read as zero.
#[must_use]
pub fn gather_components(
    data: &[u8],
    vertex_count: usize,
    base: usize,
    stride: usize,
    vertex_bytes: usize,
    component_size: usize,
    swap: bool,
) -> Vec<u8> {
    let mut out = vec![0u8; vertex_count * vertex_bytes];
    let mut truncated = false;
    for (vertex, dst) in out.chunks_exact_mut(vertex_bytes.max(1)).enumerate() {
        let start = base + vertex * stride;
        let available = data.get(start..).unwrap_or_default();
        let len = available.len().min(dst.len());
        dst[..len].copy_from_slice(&available[..len]);
        truncated |= len < dst.len();
        if swap {
            for component in dst.chunks_exact_mut(component_size) {
                component.reverse();
            }
        }
    }
    if truncated {
        tracing::debug!(vertex_count, base, stride, "Vertex buffer shorter than layout");
    }
    out
}

/// Convert a big-endian run to floats.
///
/// Signed normalized formats read two's complement values over 127 or 32767,
/// clamped to -1. UnityPy instead offsets the unsigned value by 128 or 32768,
/// so its zero byte decodes near -1 where this one decodes to 0.
///
/// Integer formats that reach this path (bytes in the oldest era) keep their
/// numeric value.
#[must_use]
pub fn parse_floats(bytes: &[u8], format: VertexFormat) -> Vec<f32> {
    match format {
        VertexFormat::Float => bytes
            .chunks_exact(4)
            .map(|c| f32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
        VertexFormat::Float16 => bytes
            .chunks_exact(2)
            .map(|c| f16::from_be_bytes([c[0], c[1]]).to_f32())
            .collect(),
        VertexFormat::UNorm8 => bytes.iter().map(|&b| f32::from(b) / 255.0).collect(),
        VertexFormat::SNorm8 => bytes
            .iter()
            .map(|&b| (f32::from(i8::from_be_bytes([b])) / 127.0).max(-1.0))
            .collect(),
        VertexFormat::UNorm16 => bytes
            .chunks_exact(2)
            .map(|c| f32::from(u16::from_be_bytes([c[0], c[1]])) / 65535.0)
            .collect(),
        VertexFormat::SNorm16 => bytes
            .chunks_exact(2)
            .map(|c| (f32::from(i16::from_be_bytes([c[0], c[1]])) / 32767.0).max(-1.0))
            .collect(),
        VertexFormat::UInt8 => bytes.iter().map(|&b| f32::from(b)).collect(),
        VertexFormat::SInt8 => bytes.iter().map(|&b| f32::from(i8::from_be_bytes([b]))).collect(),
        VertexFormat::UInt16 => bytes
            .chunks_exact(2)
            .map(|c| f32::from(u16::from_be_bytes([c[0], c[1]])))
            .collect(),
        VertexFormat::SInt16 => bytes
            .chunks_exact(2)
            .map(|c| f32::from(i16::from_be_bytes([c[0], c[1]])))
            .collect(),
        VertexFormat::UInt32 => bytes
            .chunks_exact(4)
            .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]) as f32)
            .collect(),
        VertexFormat::SInt32 => bytes
            .chunks_exact(4)
            .map(|c| i32::from_be_bytes([c[0], c[1], c[2], c[3]]) as f32)
            .collect(),
    }
}

/// Convert a big-endian run to integers: bytes unsigned, wider components
/// signed.
#[must_use]
pub fn parse_ints(bytes: &[u8], component_size: usize) -> Vec<i32> {
    match component_size {
        1 => bytes.iter().map(|&b| i32::from(b)).collect(),
        2 => bytes
            .chunks_exact(2)
            .map(|c| i32::from(i16::from_be_bytes([c[0], c[1]])))
            .collect(),
        _ => bytes
            .chunks_exact(4)
            .map(|c| i32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{VertexStream, implicit_layout};
    use crate::version::Version;
    use unimesh_types::StreamInfo;

    #[test]
    fn test_gather_swaps_little_endian_components() {
        // Two vertices, stride 6: one u16 pair of interest at offset 2.
        let data = [0xAA, 0xBB, 0x01, 0x02, 0x03, 0x04, 0xCC, 0xDD, 0x05, 0x06, 0x07, 0x08];
        let bytes = gather_components(&data, 2, 2, 6, 4, 2, true);
        assert_eq!(bytes, vec![0x02, 0x01, 0x04, 0x03, 0x06, 0x05, 0x08, 0x07]);

        let bytes = gather_components(&data, 2, 2, 6, 4, 2, false);
        assert_eq!(bytes, vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
    }

    #[test]
    fn test_gather_zero_fills_past_end() {
        let data = [1, 2, 3];
        let bytes = gather_components(&data, 2, 0, 2, 2, 1, false);
        assert_eq!(bytes, vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_parse_normalized_formats() {
        let unorm8 = parse_floats(&[0, 255, 51], VertexFormat::UNorm8);
        assert_eq!(unorm8, vec![0.0, 1.0, 0.2]);

        let snorm8 = parse_floats(&[0x7F, 0x81, 0x80], VertexFormat::SNorm8);
        assert_eq!(snorm8, vec![1.0, -1.0, -1.0]);

        let unorm16 = parse_floats(&[0xFF, 0xFF, 0x00, 0x00], VertexFormat::UNorm16);
        assert_eq!(unorm16, vec![1.0, 0.0]);

        let snorm16 = parse_floats(&[0x80, 0x00, 0x7F, 0xFF], VertexFormat::SNorm16);
        assert_eq!(snorm16, vec![-1.0, 1.0]);
    }

    #[test]
    fn test_snorm_reads_twos_complement() {
        let snorm8 = parse_floats(&[0x00, 0x40, 0xC0], VertexFormat::SNorm8);
        assert_eq!(snorm8, vec![0.0, 64.0 / 127.0, -64.0 / 127.0]);

        let snorm16 = parse_floats(&[0x00, 0x00, 0x40, 0x00, 0xC0, 0x00], VertexFormat::SNorm16);
        assert_eq!(snorm16, vec![0.0, 16384.0 / 32767.0, -16384.0 / 32767.0]);
    }

    #[test]
    fn test_parse_float_formats() {
        let floats = parse_floats(&1.5f32.to_be_bytes(), VertexFormat::Float);
        assert_eq!(floats, vec![1.5]);

        let halves = parse_floats(&f16::from_f32(-0.25).to_be_bytes(), VertexFormat::Float16);
        assert_eq!(halves, vec![-0.25]);
    }

    #[test]
    fn test_parse_ints_by_width() {
        assert_eq!(parse_ints(&[200, 3], 1), vec![200, 3]);
        assert_eq!(parse_ints(&[0xFF, 0xFE], 2), vec![-2]);
        assert_eq!(parse_ints(&[0, 0, 1, 0], 4), vec![256]);
    }

    #[test]
    fn test_extract_little_endian_positions() {
        let mut data = Vec::new();
        for v in [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let streams = [StreamInfo {
            channel_mask: 0b1,
            offset: 0,
            stride: 12,
        }];
        let layout = implicit_layout(&streams, Version::new(3, 5, 0, 0)).unwrap();
        let format = FormatInfo::new(Version::new(3, 5, 0, 0), ByteOrder::Little);

        let channels = extract_channels(&layout, &data, 2, format);
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].dimension, 3);
        assert_eq!(
            channels[0].data,
            ChannelData::Float(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        );
    }

    #[test]
    fn test_channel_outside_stream_mask_is_skipped() {
        let layout = VertexLayout {
            channels: vec![VertexChannel {
                index: 1,
                stream: 0,
                offset: 0,
                raw_format: 0,
                format: VertexFormat::Float,
                dimension: 3,
            }],
            streams: vec![VertexStream {
                channel_mask: 0b1,
                offset: 0,
                stride: 12,
            }],
        };
        let format = FormatInfo::new(Version::new(5, 0, 0, 0), ByteOrder::Big);
        assert!(extract_channels(&layout, &[0; 24], 2, format).is_empty());
    }

    #[test]
    fn test_legacy_color_counts_four_components() {
        let layout = VertexLayout {
            channels: vec![VertexChannel {
                index: 2,
                stream: 0,
                offset: 0,
                raw_format: 2,
                format: VertexFormat::UNorm8,
                dimension: 1,
            }],
            streams: vec![VertexStream {
                channel_mask: 0b100,
                offset: 0,
                stride: 4,
            }],
        };
        let format = FormatInfo::new(Version::new(5, 6, 0, 0), ByteOrder::Little);
        let channels = extract_channels(&layout, &[255, 0, 255, 0], 1, format);
        assert_eq!(channels[0].dimension, 4);
        assert_eq!(channels[0].data, ChannelData::Float(vec![1.0, 0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_integer_channels_use_int_path() {
        let layout = VertexLayout {
            channels: vec![VertexChannel {
                index: 13,
                stream: 0,
                offset: 0,
                raw_format: 6,
                format: VertexFormat::UInt8,
                dimension: 4,
            }],
            streams: vec![VertexStream {
                channel_mask: 1 << 13,
                offset: 0,
                stride: 4,
            }],
        };
        let format = FormatInfo::new(Version::new(2019, 4, 0, 0), ByteOrder::Little);
        let channels = extract_channels(&layout, &[3, 1, 0, 7], 1, format);
        assert_eq!(channels[0].data, ChannelData::Int(vec![3, 1, 0, 7]));
        assert_eq!(channels[0].data.clone().into_indices(), vec![3, 1, 0, 7]);
    }
}
