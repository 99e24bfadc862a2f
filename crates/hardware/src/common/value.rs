//! Conversions between bit vectors and unsigned integers, plus diagnostic renderings.
//!
//! Buses are little-endian: bit 0 is the least significant. Only the low 64 bits of a
//! bus take part in integer conversions.

/// Number of bits that fit in an integer bus value.
pub const VALUE_BITS: usize = 64;

/// Packs a little-endian bit slice into an integer, ignoring bits past 64.
pub fn bits_to_u64(bits: &[bool]) -> u64 {
    bits.iter()
        .take(VALUE_BITS)
        .enumerate()
        .fold(0, |acc, (i, &bit)| acc | ((bit as u64) << i))
}

/// Expands an integer into `width` little-endian bits; bits past 64 are false.
pub fn u64_to_bits(value: u64, width: usize) -> Vec<bool> {
    (0..width)
        .map(|i| i < VALUE_BITS && (value >> i) & 1 == 1)
        .collect()
}

/// Mask covering the low `width` bits.
pub const fn mask(width: usize) -> u64 {
    if width >= VALUE_BITS {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Renders a value as decimal.
pub fn to_dec(value: u64) -> String {
    value.to_string()
}

/// Renders a value as `0x`-prefixed hex, zero-padded to the width's nibble count.
pub fn to_hex(value: u64, width: usize) -> String {
    let digits = width.div_ceil(4).max(1);
    format!("0x{value:0digits$x}")
}

/// Renders a value as `0b`-prefixed binary, zero-padded to `width`.
pub fn to_bin(value: u64, width: usize) -> String {
    let digits = width.clamp(1, VALUE_BITS);
    format!("0b{value:0digits$b}")
}
