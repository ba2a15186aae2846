use thiserror::Error;

/// Result type alias for fallible map operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors produced while constructing or inserting into an
/// [`IntMap`](crate::IntMap).
///
/// Lookups, removals, and iteration never fail; absence is represented with
/// `Option` instead.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// The fill factor was not strictly between 0 and 1.
    #[error("fill factor must be in (0, 1), got {0}")]
    InvalidFillFactor(f64),

    /// The expected element count was zero.
    #[error("expected element count must be positive")]
    InvalidExpectedCount,

    /// The requested sizing needs more slots than a table can be created with.
    #[error("requested size needs more than 2^31 slots ({requested} elements)")]
    CapacityOverflow {
        /// The expected element count that was asked for.
        requested: usize,
    },

    /// The key `0` is reserved as the empty-slot marker and cannot be stored.
    ///
    /// This is a caller contract violation rather than a runtime condition.
    #[error("zero keys are illegal")]
    InvalidKey,
}

impl Error {
    /// Returns `true` for errors caused by bad construction arguments.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Error::InvalidFillFactor(_)
                | Error::InvalidExpectedCount
                | Error::CapacityOverflow { .. }
        )
    }
}
