//! Packed-vector decode profiles.
//!
//! A [`PackedBitVector`] is decoded with one of three profiles:
//!
//! - floats: `raw / (scale * (2^bits - 1)) + start` with `scale = 1 / range`,
//!   read in chunks of `items_per_chunk`
//! - ints: the raw `bits`-wide values
//! - quaternions: smallest-three encoding with a 3-bit flag header
//!
//! The hot loop is behind the [`Unpacker`] trait so an accelerated
//! implementation can stand in for the reference one. [`WordUnpacker`] is
//! such an implementation; it must stay bit-identical to
//! [`ReferenceUnpacker`].

use glam::Quat;
use unimesh_types::PackedBitVector;

use crate::bits::{BitReader, BitSource, WordReader, low_mask};

/// Widths above this are malformed and clamp to it.
pub const MAX_BIT_SIZE: u32 = 32;

/// Chunked iteration over a float vector.
///
/// `chunk_stride` is the distance in bytes between chunk starts in the
/// destination layout (`items_per_chunk * 4` for tightly packed floats).
/// `start` is an item offset into the vector and `num_chunks` limits how
/// many chunks are read; by default every complete chunk is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLayout {
    pub items_per_chunk: usize,
    pub chunk_stride: usize,
    pub start: usize,
    pub num_chunks: Option<usize>,
}

impl ChunkLayout {
    /// Tightly packed chunks of `items_per_chunk` floats.
    #[must_use]
    pub const fn packed(items_per_chunk: usize) -> Self {
        Self::new(items_per_chunk, items_per_chunk * 4)
    }

    #[must_use]
    pub const fn new(items_per_chunk: usize, chunk_stride: usize) -> Self {
        Self {
            items_per_chunk,
            chunk_stride,
            start: 0,
            num_chunks: None,
        }
    }

    /// Read `num_chunks` chunks starting at item `start`.
    #[must_use]
    pub const fn range(mut self, start: usize, num_chunks: usize) -> Self {
        self.start = start;
        self.num_chunks = Some(num_chunks);
        self
    }

    fn chunk_count(&self, num_items: usize) -> usize {
        let num_chunks = self
            .num_chunks
            .unwrap_or(num_items / self.items_per_chunk.max(1));
        let end = self.chunk_stride * num_chunks / 4;
        end.div_ceil((self.chunk_stride / 4).max(1))
    }
}

/// Capability interface over the three decode profiles.
///
/// Implementations are pure functions of their inputs; any two must produce
/// identical output for identical input.
pub trait Unpacker: Send + Sync {
    fn unpack_floats(&self, vector: &PackedBitVector, chunks: ChunkLayout) -> Vec<f32>;

    fn unpack_ints(&self, vector: &PackedBitVector) -> Vec<u32>;

    fn unpack_quats(&self, vector: &PackedBitVector) -> Vec<Quat>;
}

/// The byte/bit cursor implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceUnpacker;

/// The 64-bit window implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordUnpacker;

impl Unpacker for ReferenceUnpacker {
    fn unpack_floats(&self, vector: &PackedBitVector, chunks: ChunkLayout) -> Vec<f32> {
        floats::<BitReader>(vector, chunks)
    }

    fn unpack_ints(&self, vector: &PackedBitVector) -> Vec<u32> {
        ints::<BitReader>(vector)
    }

    fn unpack_quats(&self, vector: &PackedBitVector) -> Vec<Quat> {
        quats::<BitReader>(vector)
    }
}

impl Unpacker for WordUnpacker {
    fn unpack_floats(&self, vector: &PackedBitVector, chunks: ChunkLayout) -> Vec<f32> {
        floats::<WordReader>(vector, chunks)
    }

    fn unpack_ints(&self, vector: &PackedBitVector) -> Vec<u32> {
        ints::<WordReader>(vector)
    }

    fn unpack_quats(&self, vector: &PackedBitVector) -> Vec<Quat> {
        quats::<WordReader>(vector)
    }
}

/// Decode quantized floats with the reference unpacker.
#[must_use]
pub fn unpack_floats(vector: &PackedBitVector, chunks: ChunkLayout) -> Vec<f32> {
    ReferenceUnpacker.unpack_floats(vector, chunks)
}

/// Decode raw integers with the reference unpacker.
#[must_use]
pub fn unpack_ints(vector: &PackedBitVector) -> Vec<u32> {
    ReferenceUnpacker.unpack_ints(vector)
}

/// Decode smallest-three quaternions with the reference unpacker.
#[must_use]
pub fn unpack_quats(vector: &PackedBitVector) -> Vec<Quat> {
    ReferenceUnpacker.unpack_quats(vector)
}

fn bit_width(vector: &PackedBitVector) -> u32 {
    u32::from(vector.bit_size).min(MAX_BIT_SIZE)
}

fn floats<'a, R: BitSource<'a>>(vector: &'a PackedBitVector, chunks: ChunkLayout) -> Vec<f32> {
    let bits = bit_width(vector);
    let mut reader = R::at_bit(&vector.data, bits as usize * chunks.start);

    // A zero range makes the scale infinite, and a zero-width vector makes
    // the denominator zero; the latter decodes to +inf.
    let scale = if vector.range == 0.0 {
        f64::INFINITY
    } else {
        1.0 / f64::from(vector.range)
    };
    let denominator = scale * low_mask(bits) as f64;
    let start = f64::from(vector.start);

    let count = chunks.chunk_count(vector.num_items as usize);
    let mut values = Vec::with_capacity(count * chunks.items_per_chunk);
    for _ in 0..count {
        for _ in 0..chunks.items_per_chunk {
            let raw = f64::from(reader.read(bits));
            let quotient = if denominator == 0.0 {
                f64::INFINITY
            } else {
                raw / denominator
            };
            values.push((quotient + start) as f32);
        }
    }
    values
}

fn ints<'a, R: BitSource<'a>>(vector: &'a PackedBitVector) -> Vec<u32> {
    let bits = bit_width(vector);
    let mut reader = R::at_bit(&vector.data, 0);
    (0..vector.num_items).map(|_| reader.read(bits)).collect()
}

fn quats<'a, R: BitSource<'a>>(vector: &'a PackedBitVector) -> Vec<Quat> {
    let mut reader = R::at_bit(&vector.data, 0);
    (0..vector.num_items)
        .map(|_| {
            let flags = reader.read(3);
            let dropped = (flags & 3) as usize;

            let mut q = [0.0f64; 4];
            let mut sum = 0.0;
            for (j, component) in q.iter_mut().enumerate() {
                if j == dropped {
                    continue;
                }
                let bits = if (dropped + 1) % 4 == j { 9 } else { 10 };
                let raw = f64::from(reader.read(bits));
                *component = raw / (0.5 * low_mask(bits) as f64) - 1.0;
                sum += *component * *component;
            }

            q[dropped] = (1.0 - sum).max(0.0).sqrt();
            if flags & 4 != 0 {
                q[dropped] = -q[dropped];
            }
            Quat::from_xyzw(q[0] as f32, q[1] as f32, q[2] as f32, q[3] as f32)
        })
        .collect()
}
