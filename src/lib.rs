#![deny(missing_docs, clippy::all, clippy::pedantic)]

//! Fixed-capacity hash map with separate chaining.
//!
//! # `chained_map::ChainedHashMap`
//! A hash map whose bucket table is allocated once at construction and never resized. Colliding
//! keys share a bucket and are found by a linear scan of that bucket.

pub mod chained_map;
pub use chained_map::ChainedHashMap;

#[cfg(not(feature = "equivalent"))]
mod equivalent;
#[cfg(not(feature = "equivalent"))]
pub use equivalent::Equivalent;
#[cfg(feature = "equivalent")]
pub use ::equivalent::Equivalent;

#[cfg(feature = "serde")]
mod serde;
