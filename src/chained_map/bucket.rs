use crate::Equivalent;
use std::mem::replace;
use std::slice;

/// A key-value pair stored in a [`Bucket`].
///
/// The key is fixed once the entry is created; the value may be overwritten.
#[derive(Clone, Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) val: V,
}

/// [`Bucket`] is the collision chain of a single table slot.
///
/// Entries are kept in insertion order until one is removed, after which the order is
/// unspecified. A key appears at most once.
#[derive(Clone, Debug)]
pub(crate) struct Bucket<K, V> {
    entries: Vec<Entry<K, V>>,
}

impl<K, V> Bucket<K, V> {
    /// Returns the number of entries in the chain.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns a reference to the value associated with the key.
    #[inline]
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: Equivalent<K> + ?Sized,
    {
        self.position(key).map(|i| &self.entries[i].val)
    }

    /// Returns a mutable reference to the value associated with the key.
    #[inline]
    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: Equivalent<K> + ?Sized,
    {
        self.position(key).map(|i| &mut self.entries[i].val)
    }

    /// Overwrites the value of an existing entry, or hands the value back if the key is absent.
    #[inline]
    pub(crate) fn update<Q>(&mut self, key: &Q, val: V) -> Result<V, V>
    where
        Q: Equivalent<K> + ?Sized,
    {
        match self.get_mut(key) {
            Some(slot) => Ok(replace(slot, val)),
            None => Err(val),
        }
    }

    /// Appends a new entry.
    ///
    /// The caller must ensure the key is not already in the chain.
    #[inline]
    pub(crate) fn push(&mut self, key: K, val: V) {
        self.entries.push(Entry { key, val });
    }

    /// Removes the entry associated with the key.
    #[inline]
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<Entry<K, V>>
    where
        Q: Equivalent<K> + ?Sized,
    {
        let index = self.position(key)?;
        Some(self.entries.swap_remove(index))
    }

    /// Retains the entries satisfying the predicate and returns the number of removed entries.
    #[inline]
    pub(crate) fn retain<F: FnMut(&K, &mut V) -> bool>(&mut self, mut pred: F) -> usize {
        let before = self.entries.len();
        self.entries.retain_mut(|e| pred(&e.key, &mut e.val));
        before - self.entries.len()
    }

    /// Drops every entry in the chain.
    #[inline]
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    #[inline]
    pub(crate) fn iter(&self) -> slice::Iter<'_, Entry<K, V>> {
        self.entries.iter()
    }

    #[inline]
    fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        Q: Equivalent<K> + ?Sized,
    {
        self.entries.iter().position(|e| key.equivalent(&e.key))
    }
}

impl<K, V> Default for Bucket<K, V> {
    #[inline]
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}
