//! Table sizing.

use crate::error::Error;
use crate::error::Result;

/// Largest slot-pair count a table may be created with. Anything above this
/// would not survive the `u32` power-of-two rounding.
const MAX_INITIAL_PAIRS: u64 = 1 << 31;

/// Rounds `x` up to the next power of two by bit smearing.
///
/// `0` maps to `1`. Inputs whose next power of two does not fit in a `u32`
/// saturate to `u32::MAX`.
#[inline]
pub(crate) const fn next_power_of_two(x: u32) -> u32 {
    if x == 0 {
        return 1;
    }

    let mut x = x - 1;
    x |= x >> 1;
    x |= x >> 2;
    x |= x >> 4;
    x |= x >> 8;
    x |= x >> 16;

    match x.checked_add(1) {
        Some(p) => p,
        None => u32::MAX,
    }
}

/// `ceil(expected / fill_factor)`, saturating at `u64::MAX`.
///
/// Float-to-int `as` casts truncate and saturate, so this stays in `core`.
#[inline]
fn required_pairs(expected: usize, fill_factor: f64) -> u64 {
    let exact = expected as f64 / fill_factor;
    let truncated = exact as u64;
    if (truncated as f64) < exact {
        truncated.saturating_add(1)
    } else {
        truncated
    }
}

pub(crate) fn validate_fill_factor(fill_factor: f64) -> Result<()> {
    // Written negated so NaN is rejected too.
    if !(fill_factor > 0.0 && fill_factor < 1.0) {
        return Err(Error::InvalidFillFactor(fill_factor));
    }
    Ok(())
}

/// Number of (key, value) slot pairs in a table. Always a power of two and at
/// least 2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Capacity {
    pairs: usize,
}

impl Capacity {
    /// The smallest power-of-two capacity, at least 2, holding `expected`
    /// elements below `fill_factor` occupancy.
    pub(crate) fn for_expected(expected: usize, fill_factor: f64) -> Result<Self> {
        validate_fill_factor(fill_factor)?;
        if expected == 0 {
            return Err(Error::InvalidExpectedCount);
        }

        let required = required_pairs(expected, fill_factor);
        if required > MAX_INITIAL_PAIRS {
            return Err(Error::CapacityOverflow {
                requested: expected,
            });
        }

        let pairs = next_power_of_two(required as u32).max(2);
        Ok(Capacity {
            pairs: pairs as usize,
        })
    }

    #[inline(always)]
    pub(crate) fn pairs(self) -> usize {
        self.pairs
    }

    /// Length of the interleaved key/value storage.
    #[inline(always)]
    pub(crate) fn slots(self) -> usize {
        self.pairs * 2
    }

    /// Folds a scrambled hash into a pair number.
    #[inline(always)]
    pub(crate) fn mask(self) -> u64 {
        (self.pairs - 1) as u64
    }

    /// Folds a storage index while probing.
    #[inline(always)]
    pub(crate) fn mask2(self) -> u64 {
        (self.slots() - 1) as u64
    }

    /// Element count at which the table grows: `floor(pairs * fill_factor)`.
    ///
    /// Clamped to `1..pairs` so there is always an empty slot to terminate a
    /// probe and a full table still counts toward growth.
    #[inline]
    pub(crate) fn threshold(self, fill_factor: f64) -> usize {
        ((self.pairs as f64 * fill_factor) as usize).clamp(1, self.pairs - 1)
    }

    #[inline]
    pub(crate) fn doubled(self) -> Self {
        Capacity {
            pairs: self.pairs.checked_mul(2).expect("capacity overflow"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_power_of_two_edges() {
        assert_eq!(next_power_of_two(0), 1);
        assert_eq!(next_power_of_two(1), 1);
        assert_eq!(next_power_of_two(2), 2);
        assert_eq!(next_power_of_two(3), 4);
        assert_eq!(next_power_of_two(17), 32);
        assert_eq!(next_power_of_two(1 << 20), 1 << 20);
        assert_eq!(next_power_of_two((1 << 20) + 1), 1 << 21);
        assert_eq!(next_power_of_two(1 << 31), 1 << 31);
        assert_eq!(next_power_of_two((1 << 31) + 1), u32::MAX);
        assert_eq!(next_power_of_two(u32::MAX), u32::MAX);
    }

    #[test]
    fn sizing_rounds_to_power_of_two() {
        let capacity = Capacity::for_expected(10, 0.6).unwrap();
        assert_eq!(capacity.pairs(), 32);
        assert_eq!(capacity.slots(), 64);
        assert_eq!(capacity.mask(), 31);
        assert_eq!(capacity.mask2(), 63);
        assert_eq!(capacity.threshold(0.6), 19);

        let doubled = capacity.doubled();
        assert_eq!(doubled.pairs(), 64);
        assert_eq!(doubled.threshold(0.6), 38);
    }

    #[test]
    fn sizing_exact_division() {
        // 8 / 0.5 is exactly 16, no rounding up past it.
        assert_eq!(Capacity::for_expected(8, 0.5).unwrap().pairs(), 16);
        assert_eq!(Capacity::for_expected(9, 0.5).unwrap().pairs(), 32);
    }

    #[test]
    fn sizing_minimum_is_two() {
        assert_eq!(Capacity::for_expected(1, 0.99).unwrap().pairs(), 2);
    }

    #[test]
    fn threshold_always_leaves_a_free_slot() {
        let capacity = Capacity::for_expected(1, 0.99).unwrap();
        assert_eq!(capacity.threshold(0.99), 1);
        let capacity = Capacity::for_expected(1, 0.01).unwrap();
        assert_eq!(capacity.pairs(), 128);
        assert_eq!(capacity.threshold(0.01), 1);
    }

    #[test]
    fn invalid_arguments() {
        assert_eq!(
            Capacity::for_expected(10, 0.0),
            Err(Error::InvalidFillFactor(0.0))
        );
        assert_eq!(
            Capacity::for_expected(10, 1.0),
            Err(Error::InvalidFillFactor(1.0))
        );
        assert_eq!(
            Capacity::for_expected(10, -0.5),
            Err(Error::InvalidFillFactor(-0.5))
        );
        assert!(matches!(
            Capacity::for_expected(10, f64::NAN),
            Err(Error::InvalidFillFactor(_))
        ));
        assert_eq!(
            Capacity::for_expected(0, 0.5),
            Err(Error::InvalidExpectedCount)
        );
    }

    #[test]
    fn oversized_requests_are_rejected() {
        let requested = 1usize << 31;
        assert_eq!(
            Capacity::for_expected(requested, 0.5),
            Err(Error::CapacityOverflow { requested })
        );
        assert_eq!(
            Capacity::for_expected(1 << 30, 0.5).unwrap().pairs(),
            1 << 31
        );
    }
}
