//! Non-byte-aligned bit extraction.
//!
//! Packed vectors store their items back to back, least significant bit
//! first, with no padding between items. Two readers walk that layout:
//!
//! - [`BitReader`]: the reference byte/bit cursor, one byte per step.
//! - [`WordReader`]: loads an unaligned 64-bit window per item and shifts it
//!   into place.
//!
//! Both read bytes past the end of the buffer as zero, so malformed input
//! yields garbage values rather than a panic. Their outputs are identical for
//! every buffer and width up to 32 bits.

/// A sequential source of LSB-first bit fields.
pub trait BitSource<'a>: Sized {
    /// Start reading `data` at absolute bit position `bit_offset`.
    fn at_bit(data: &'a [u8], bit_offset: usize) -> Self;

    /// Read the next `bits`-wide unsigned field (`bits <= 32`).
    fn read(&mut self, bits: u32) -> u32;
}

/// Mask covering the low `bits` bits.
#[inline]
#[must_use]
pub const fn low_mask(bits: u32) -> u64 {
    (1u64 << bits) - 1
}

/// Reference cursor over a byte buffer.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    index: usize,
    bit: u32,
}

impl<'a> BitReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self::at_bit(data, 0)
    }

    /// Current absolute bit position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.index * 8 + self.bit as usize
    }
}

impl<'a> BitSource<'a> for BitReader<'a> {
    fn at_bit(data: &'a [u8], bit_offset: usize) -> Self {
        Self {
            data,
            index: bit_offset / 8,
            bit: (bit_offset % 8) as u32,
        }
    }

    fn read(&mut self, bits: u32) -> u32 {
        let mut value = 0u64;
        let mut filled = 0;
        while filled < bits {
            let byte = self.data.get(self.index).copied().unwrap_or(0);
            value |= u64::from(byte >> self.bit) << filled;
            let taken = (bits - filled).min(8 - self.bit);
            self.bit += taken;
            filled += taken;
            if self.bit == 8 {
                self.index += 1;
                self.bit = 0;
            }
        }
        (value & low_mask(bits)) as u32
    }
}

/// Word-at-a-time reader producing the same fields as [`BitReader`].
#[derive(Debug, Clone)]
pub struct WordReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl WordReader<'_> {
    /// Current absolute bit position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    fn window(&self, byte: usize) -> u64 {
        if let Some(bytes) = self.data.get(byte..byte + 8) {
            let mut word = [0u8; 8];
            word.copy_from_slice(bytes);
            return u64::from_le_bytes(word);
        }
        // Tail of the buffer: zero-extend.
        let mut word = [0u8; 8];
        if let Some(tail) = self.data.get(byte..) {
            word[..tail.len()].copy_from_slice(tail);
        }
        u64::from_le_bytes(word)
    }
}

impl<'a> BitSource<'a> for WordReader<'a> {
    fn at_bit(data: &'a [u8], bit_offset: usize) -> Self {
        Self {
            data,
            position: bit_offset,
        }
    }

    #[inline]
    fn read(&mut self, bits: u32) -> u32 {
        if bits == 0 {
            return 0;
        }
        // A 32-bit field starting at bit 7 spans at most 39 bits.
        let window = self.window(self.position / 8);
        let shift = self.position % 8;
        self.position += bits as usize;
        ((window >> shift) & low_mask(bits)) as u32
    }
}
