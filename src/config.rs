cfg_if::cfg_if! {
    if #[cfg(feature = "fill-ninety")] {
        /// Fill factor used by [`IntMap::with_capacity`](crate::IntMap::with_capacity)
        /// and [`Default`].
        pub const DEFAULT_FILL_FACTOR: f64 = 0.9;
    } else if #[cfg(feature = "fill-seventy-five")] {
        /// Fill factor used by [`IntMap::with_capacity`](crate::IntMap::with_capacity)
        /// and [`Default`].
        pub const DEFAULT_FILL_FACTOR: f64 = 0.75;
    } else {
        /// Fill factor used by [`IntMap::with_capacity`](crate::IntMap::with_capacity)
        /// and [`Default`].
        pub const DEFAULT_FILL_FACTOR: f64 = 0.6;
    }
}

/// Expected element count a [`Default`] map is sized for.
pub const DEFAULT_EXPECTED: usize = 16;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fill_factor_is_in_range() {
        assert!(DEFAULT_FILL_FACTOR > 0.0 && DEFAULT_FILL_FACTOR < 1.0);
    }
}
