//! Vertex layout resolution.
//!
//! Turns the channel and stream descriptors of a [`VertexData`] into a
//! [`VertexLayout`]: the active channels with their formats and offsets, and
//! the streams they interleave into. How much is stored versus derived
//! depends on the era:
//!
//! | Era | Channels | Streams |
//! |---|---|---|
//! | before 4.0 | implied by each stream's channel mask | stored |
//! | 4.x | stored | stored |
//! | 5.0 and later | stored | derived from the channels |

use unimesh_types::{ChannelInfo, StreamInfo, VertexData};

use crate::error::DecodeResult;
use crate::format::{IMPLICIT_SLOTS, VertexFormat};
use crate::version::Version;

/// Streams start on this byte boundary when derived.
pub const STREAM_ALIGNMENT: usize = 16;

/// One active vertex channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexChannel {
    /// Channel slot, which decides the semantic.
    pub index: usize,
    pub stream: usize,
    /// Byte offset within a vertex of the stream.
    pub offset: usize,
    /// The format tag as stored, for era-specific checks.
    pub raw_format: u8,
    pub format: VertexFormat,
    pub dimension: usize,
}

impl VertexChannel {
    /// Bytes this channel occupies per vertex.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.dimension * self.format.size()
    }
}

/// One interleaved byte range of the vertex buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VertexStream {
    pub channel_mask: u32,
    /// Byte offset of the stream in the vertex buffer.
    pub offset: usize,
    /// Bytes per vertex.
    pub stride: usize,
}

impl VertexStream {
    #[must_use]
    pub fn has_channel(&self, index: usize) -> bool {
        index < 32 && self.channel_mask & (1 << index) != 0
    }
}

impl From<StreamInfo> for VertexStream {
    fn from(info: StreamInfo) -> Self {
        Self {
            channel_mask: info.channel_mask,
            offset: info.offset as usize,
            stride: info.stride as usize,
        }
    }
}

/// Resolved layout of a vertex buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexLayout {
    /// Active channels only, in slot order.
    pub channels: Vec<VertexChannel>,
    pub streams: Vec<VertexStream>,
}

/// How a version describes its layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutEra {
    Implicit,
    Stored,
    Explicit,
}

impl LayoutEra {
    #[must_use]
    pub fn of(version: Version) -> Self {
        if version.major < 4 {
            Self::Implicit
        } else if version.major < 5 {
            Self::Stored
        } else {
            Self::Explicit
        }
    }
}

/// Resolve the layout of `vertex_data` for `version`.
pub fn resolve_layout(vertex_data: &VertexData, version: Version) -> DecodeResult<VertexLayout> {
    let era = LayoutEra::of(version);
    tracing::trace!(?era, "Resolving vertex layout");
    match era {
        LayoutEra::Implicit => implicit_layout(&vertex_data.stream_infos(), version),
        LayoutEra::Stored => Ok(VertexLayout {
            channels: active_channels(&vertex_data.channels, version)?,
            streams: vertex_data
                .stream_infos()
                .into_iter()
                .map(VertexStream::from)
                .collect(),
        }),
        LayoutEra::Explicit => explicit_layout(
            &vertex_data.channels,
            vertex_data.vertex_count as usize,
            version,
        ),
    }
}

/// Channels implied by per-stream channel masks.
///
/// A slot claimed by more than one stream belongs to the last one.
pub fn implicit_layout(streams: &[StreamInfo], version: Version) -> DecodeResult<VertexLayout> {
    let mut slots: [Option<VertexChannel>; IMPLICIT_SLOTS.len()] = [None; IMPLICIT_SLOTS.len()];
    let mut resolved = Vec::with_capacity(streams.len());

    for (stream_index, info) in streams.iter().enumerate() {
        let mut stream = VertexStream::from(*info);
        let mut offset = 0;
        for (index, &(raw_format, dimension)) in IMPLICIT_SLOTS.iter().enumerate() {
            if !stream.has_channel(index) {
                continue;
            }
            let channel = VertexChannel {
                index,
                stream: stream_index,
                offset,
                raw_format,
                format: VertexFormat::from_raw(raw_format, version)?,
                dimension: usize::from(dimension),
            };
            offset += channel.byte_size();
            slots[index] = Some(channel);
        }
        if stream.stride == 0 {
            stream.stride = offset;
        }
        resolved.push(stream);
    }

    Ok(VertexLayout {
        channels: slots.into_iter().flatten().collect(),
        streams: resolved,
    })
}

/// Streams derived from explicit channel descriptors.
pub fn explicit_layout(
    channels: &[ChannelInfo],
    vertex_count: usize,
    version: Version,
) -> DecodeResult<VertexLayout> {
    let channels_resolved = active_channels(channels, version)?;
    let stream_count = 1 + channels
        .iter()
        .map(|c| usize::from(c.stream))
        .max()
        .unwrap_or(0);

    let mut streams = Vec::with_capacity(stream_count);
    let mut offset = 0;
    for stream_index in 0..stream_count {
        let mut stream = VertexStream {
            offset,
            ..VertexStream::default()
        };
        for channel in channels_resolved.iter().filter(|c| c.stream == stream_index) {
            stream.channel_mask |= 1 << channel.index;
            stream.stride += channel.byte_size();
        }
        offset += vertex_count * stream.stride;
        offset = align_stream(offset);
        streams.push(stream);
    }

    Ok(VertexLayout {
        channels: channels_resolved,
        streams,
    })
}

/// Round `offset` up to the stream alignment.
#[must_use]
pub const fn align_stream(offset: usize) -> usize {
    (offset + (STREAM_ALIGNMENT - 1)) & !(STREAM_ALIGNMENT - 1)
}

fn active_channels(channels: &[ChannelInfo], version: Version) -> DecodeResult<Vec<VertexChannel>> {
    channels
        .iter()
        .enumerate()
        // Slots past 31 cannot appear in a stream mask.
        .filter(|(index, info)| info.dimension > 0 && *index < 32)
        .map(|(index, info)| {
            Ok(VertexChannel {
                index,
                stream: usize::from(info.stream),
                offset: usize::from(info.offset),
                raw_format: info.format,
                format: VertexFormat::from_raw(info.format, version)?,
                dimension: usize::from(info.dimension),
            })
        })
        .collect()
}
