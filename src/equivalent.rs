//! Key equivalence mirroring the [`equivalent`](https://crates.io/crates/equivalent) crate.
//!
//! Enable the `equivalent` feature to use the trait from that crate instead.

use std::borrow::Borrow;

/// Key equivalence trait.
///
/// Lookup methods of [`ChainedHashMap`](crate::ChainedHashMap) accept any `Q: Equivalent<K>`, so
/// a `ChainedHashMap<String, V>` can be queried with a `&str`. Implementations must hash equal
/// keys equally, the same contract [`Borrow`] places on [`Hash`](std::hash::Hash).
pub trait Equivalent<K: ?Sized> {
    /// Returns `true` if `self` and `key` denote the same key.
    fn equivalent(&self, key: &K) -> bool;
}

impl<Q: ?Sized, K: ?Sized> Equivalent<K> for Q
where
    Q: Eq,
    K: Borrow<Q>,
{
    #[inline]
    fn equivalent(&self, key: &K) -> bool {
        PartialEq::eq(self, key.borrow())
    }
}
