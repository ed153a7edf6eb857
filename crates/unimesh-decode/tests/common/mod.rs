//! Shared builders for integration tests.

#![allow(dead_code)]

use unimesh_types::PackedBitVector;

/// Pack `values` LSB-first at `bits` bits each.
pub fn pack(values: &[u32], bits: u32) -> Vec<u8> {
    let total = values.len() * bits as usize;
    let mut out = vec![0u8; total.div_ceil(8)];
    let mut pos = 0usize;
    for &value in values {
        for b in 0..bits {
            if (u64::from(value) >> b) & 1 == 1 {
                out[pos / 8] |= 1 << (pos % 8);
            }
            pos += 1;
        }
    }
    out
}

/// An integer vector holding `values`.
pub fn int_vector(values: &[u32], bits: u8) -> PackedBitVector {
    PackedBitVector::ints(
        u32::try_from(values.len()).unwrap(),
        bits,
        pack(values, u32::from(bits)),
    )
}

/// A float vector of raw `bits`-wide values over `[start, start + range]`.
pub fn float_vector(raw: &[u32], bits: u8, range: f32, start: f32) -> PackedBitVector {
    PackedBitVector::floats(
        u32::try_from(raw.len()).unwrap(),
        bits,
        range,
        start,
        pack(raw, u32::from(bits)),
    )
}

/// Little-endian bytes of `values`.
pub fn le_floats(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Big-endian bytes of `values`.
pub fn be_floats(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

/// Little-endian 16-bit index buffer.
pub fn le_indices(indices: &[u16]) -> Vec<u8> {
    indices.iter().flat_map(|i| i.to_le_bytes()).collect()
}
