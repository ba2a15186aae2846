/// Multiplier used to scramble keys: the 32-bit truncation of the golden
/// ratio, as in Knuth's multiplicative hashing.
pub const PHI: u64 = 0x9E37_79B9;

/// Spreads the bits of `key` so that keys differing only in their low bits
/// land in distant slots.
///
/// ```rust
/// use phimap::hash::scramble;
///
/// assert_eq!(scramble(0), 0);
/// assert_ne!(scramble(1) & 0xFF, scramble(2) & 0xFF);
/// ```
#[inline(always)]
pub const fn scramble(key: u64) -> u64 {
    let h = key.wrapping_mul(PHI);
    h ^ (h >> 16)
}
