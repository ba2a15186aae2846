#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod capacity;

/// Compile-time defaults selected by Cargo features.
///
/// When several `fill-*` features are enabled the densest one wins.
pub mod config;

/// Error type returned by fallible map operations.
pub mod error;

/// The key scrambling function used to pick home slots.
pub mod hash;

/// The flat `u64 -> u64` map and its iterators.
pub mod int_map;

pub use config::DEFAULT_FILL_FACTOR;
pub use error::Error;
pub use error::Result;
pub use int_map::IntMap;
pub use int_map::Iter;
