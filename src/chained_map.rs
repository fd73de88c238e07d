//! [`ChainedHashMap`] is a fixed-capacity hash map with separate chaining.

mod bucket;

use super::Equivalent;
use bucket::{Bucket, Entry};
use log::{debug, trace};
use std::collections::hash_map::RandomState;
use std::fmt::{self, Debug};
use std::hash::{BuildHasher, Hash, Hasher};
use std::iter::FusedIterator;
use std::slice;

/// Fixed-capacity hash map with separate chaining.
///
/// [`ChainedHashMap`] allocates `2 * size` buckets when it is constructed and never resizes. An
/// entry for a key always lives in the bucket at `hash(key) % capacity`; keys hashing to the same
/// bucket are chained in that bucket and found by a linear scan.
///
/// ## Capacity
///
/// The map holds at most [`capacity`](Self::capacity) entries. Once it is full, every
/// [`set`](Self::set) fails, including one that would only update the value of a key already in
/// the map. Removing an entry makes room again. [`get_mut`](Self::get_mut) is the one way to
/// change the value of a key in a full map: it edits the value in place and never checks the
/// capacity.
///
/// ## Absence
///
/// Lookups and removals report a missing key with [`None`], and [`load`](Self::load) returns
/// [`None`] for a map without buckets; nothing in the map panics on a missing key.
pub struct ChainedHashMap<K, V, H = RandomState>
where
    H: BuildHasher,
{
    buckets: Box<[Bucket<K, V>]>,
    len: usize,
    build_hasher: H,
}

/// An iterator over the entries of a [`ChainedHashMap`].
///
/// Entries are yielded bucket by bucket; the order is otherwise unspecified.
pub struct Iter<'m, K, V> {
    buckets: slice::Iter<'m, Bucket<K, V>>,
    chain: slice::Iter<'m, Entry<K, V>>,
    remaining: usize,
}

impl<K, V, H> ChainedHashMap<K, V, H>
where
    H: BuildHasher,
{
    /// Creates an empty [`ChainedHashMap`] with `2 * size` buckets and the given [`BuildHasher`].
    ///
    /// # Panics
    ///
    /// Panics if `2 * size` overflows `usize`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_map::ChainedHashMap;
    /// use std::collections::hash_map::RandomState;
    ///
    /// let map: ChainedHashMap<u64, u32, RandomState> =
    ///     ChainedHashMap::with_hasher(8, RandomState::new());
    ///
    /// assert_eq!(map.capacity(), 16);
    /// ```
    #[inline]
    #[must_use]
    pub fn with_hasher(size: usize, build_hasher: H) -> Self {
        let capacity = match size.checked_mul(2) {
            Some(capacity) => capacity,
            None => panic!("capacity overflow: size {size} cannot be doubled"),
        };
        let buckets = (0..capacity).map(|_| Bucket::default()).collect();
        trace!("allocated {capacity} buckets for size {size}");
        Self {
            buckets,
            len: 0,
            build_hasher,
        }
    }

    /// Returns the number of entries in the [`ChainedHashMap`].
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_map::ChainedHashMap;
    ///
    /// let mut map: ChainedHashMap<u64, u32> = ChainedHashMap::new(4);
    ///
    /// assert!(map.set(1, 0));
    /// assert_eq!(map.len(), 1);
    /// ```
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the [`ChainedHashMap`] is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the capacity of the [`ChainedHashMap`].
    ///
    /// The capacity is both the number of buckets and the maximum number of entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_map::ChainedHashMap;
    ///
    /// let map: ChainedHashMap<u64, u32> = ChainedHashMap::new(5);
    /// assert_eq!(map.capacity(), 10);
    ///
    /// let map: ChainedHashMap<u64, u32> = ChainedHashMap::default();
    /// assert_eq!(map.capacity(), 0);
    /// ```
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` if no more entries can be set.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len >= self.capacity()
    }

    /// Returns the load factor, `len / capacity`.
    ///
    /// Returns `None` if the capacity is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_map::ChainedHashMap;
    ///
    /// let mut map: ChainedHashMap<&str, &str> = ChainedHashMap::new(5);
    /// assert_eq!(map.load(), Some(0.0));
    ///
    /// assert!(map.set("Edmund", "Chinese"));
    /// assert!(map.set("Urjit", "Indian"));
    /// assert_eq!(map.load(), Some(0.2));
    ///
    /// let empty: ChainedHashMap<&str, &str> = ChainedHashMap::new(0);
    /// assert_eq!(empty.load(), None);
    /// ```
    #[allow(clippy::cast_precision_loss)]
    #[inline]
    #[must_use]
    pub fn load(&self) -> Option<f64> {
        match self.capacity() {
            0 => None,
            capacity => Some(self.len as f64 / capacity as f64),
        }
    }

    /// Returns a reference to the [`BuildHasher`].
    #[inline]
    #[must_use]
    pub fn hasher(&self) -> &H {
        &self.build_hasher
    }

    /// Returns an iterator over the entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_map::ChainedHashMap;
    ///
    /// let mut map: ChainedHashMap<u64, u32> = ChainedHashMap::new(4);
    ///
    /// assert!(map.set(1, 10));
    /// assert!(map.set(2, 20));
    ///
    /// let mut sum = 0;
    /// for (k, v) in map.iter() {
    ///     sum += *k as u32 + *v;
    /// }
    /// assert_eq!(sum, 33);
    /// ```
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            chain: <&[Entry<K, V>]>::default().iter(),
            remaining: self.len,
        }
    }

    /// Scans all the entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_map::ChainedHashMap;
    ///
    /// let mut map: ChainedHashMap<usize, usize> = ChainedHashMap::new(2);
    ///
    /// assert!(map.set(1, 0));
    /// assert!(map.set(2, 1));
    ///
    /// let mut sum = 0;
    /// map.scan(|k, v| { sum += *k + *v; });
    /// assert_eq!(sum, 4);
    /// ```
    #[inline]
    pub fn scan<F: FnMut(&K, &V)>(&self, mut scanner: F) {
        self.iter().for_each(|(k, v)| scanner(k, v));
    }

    /// Retains the entries specified by the predicate.
    ///
    /// Entries for which the predicate returns `false` are dropped. The capacity is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_map::ChainedHashMap;
    ///
    /// let mut map: ChainedHashMap<u64, u32> = ChainedHashMap::new(4);
    ///
    /// assert!(map.set(1, 0));
    /// assert!(map.set(2, 1));
    /// assert!(map.set(3, 2));
    ///
    /// map.retain(|k, v| { *v += 1; *k == 1 });
    /// assert_eq!(map.get(&1), Some(&1));
    /// assert!(map.get(&2).is_none());
    /// assert_eq!(map.len(), 1);
    /// ```
    #[inline]
    pub fn retain<F: FnMut(&K, &mut V) -> bool>(&mut self, mut pred: F) {
        let removed: usize = self
            .buckets
            .iter_mut()
            .map(|bucket| bucket.retain(&mut pred))
            .sum();
        self.len -= removed;
        trace!("retain removed {removed} entries, {} left", self.len);
    }

    /// Clears the [`ChainedHashMap`] by dropping all the entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_map::ChainedHashMap;
    ///
    /// let mut map: ChainedHashMap<u64, u32> = ChainedHashMap::new(1);
    ///
    /// assert!(map.set(1, 0));
    /// assert!(map.set(2, 0));
    /// map.clear();
    ///
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 2);
    /// assert!(map.set(3, 0));
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(Bucket::clear);
        self.len = 0;
    }
}

impl<K, V, H> ChainedHashMap<K, V, H>
where
    K: Eq + Hash,
    H: BuildHasher,
{
    /// Sets the value of a key.
    ///
    /// Returns `false` if the map is full, in which case nothing changes. The full check comes
    /// before the key is looked up, so updating a key already in a full map fails as well.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_map::ChainedHashMap;
    ///
    /// let mut map: ChainedHashMap<u64, u32> = ChainedHashMap::new(1);
    ///
    /// assert!(map.set(1, 0));
    /// assert!(map.set(1, 1));
    /// assert_eq!(map.get(&1), Some(&1));
    ///
    /// assert!(map.set(2, 2));
    /// assert!(!map.set(3, 3));
    /// assert!(!map.set(1, 4));
    /// ```
    #[inline]
    pub fn set(&mut self, key: K, val: V) -> bool {
        self.try_set(key, val).is_ok()
    }

    /// Sets the value of a key, returning the previous value if the key was present.
    ///
    /// Returns the key-value pair back if the map is full.
    ///
    /// # Errors
    ///
    /// Returns an error along with the supplied key-value pair if the map is full.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_map::ChainedHashMap;
    ///
    /// let mut map: ChainedHashMap<u64, u32> = ChainedHashMap::new(1);
    ///
    /// assert_eq!(map.try_set(1, 0), Ok(None));
    /// assert_eq!(map.try_set(1, 1), Ok(Some(0)));
    /// assert_eq!(map.try_set(2, 2), Ok(None));
    /// assert_eq!(map.try_set(3, 3), Err((3, 3)));
    /// ```
    #[inline]
    pub fn try_set(&mut self, key: K, val: V) -> Result<Option<V>, (K, V)> {
        if self.is_full() {
            debug!(
                "set rejected: {} entries fill all {} buckets",
                self.len,
                self.capacity()
            );
            return Err((key, val));
        }
        let index = self.index_of(&key);
        let bucket = &mut self.buckets[index];
        match bucket.update(&key, val) {
            Ok(prev) => {
                trace!("updated an entry in bucket {index}");
                Ok(Some(prev))
            }
            Err(val) => {
                bucket.push(key, val);
                self.len += 1;
                trace!(
                    "inserted an entry in bucket {index}, chain length {}",
                    bucket.len()
                );
                Ok(None)
            }
        }
    }

    /// Returns a reference to the value associated with the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_map::ChainedHashMap;
    ///
    /// let mut map: ChainedHashMap<String, String> = ChainedHashMap::new(5);
    ///
    /// assert!(map.get("Edmund").is_none());
    /// assert!(map.set("Edmund".to_owned(), "Chinese".to_owned()));
    /// assert_eq!(map.get("Edmund").map(String::as_str), Some("Chinese"));
    /// ```
    #[inline]
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        if self.is_empty() {
            return None;
        }
        self.buckets[self.index_of(key)].get(key)
    }

    /// Returns a mutable reference to the value associated with the key.
    ///
    /// Modifying the value this way is not subject to the capacity limit.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_map::ChainedHashMap;
    ///
    /// let mut map: ChainedHashMap<u64, u32> = ChainedHashMap::new(1);
    ///
    /// assert!(map.set(1, 0));
    /// if let Some(v) = map.get_mut(&1) {
    ///     *v += 2;
    /// }
    /// assert_eq!(map.get(&1), Some(&2));
    /// ```
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        if self.is_empty() {
            return None;
        }
        let index = self.index_of(key);
        self.buckets[index].get_mut(key)
    }

    /// Returns `true` if the [`ChainedHashMap`] contains a value for the key.
    #[inline]
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Removes a key from the [`ChainedHashMap`], returning the value that was stored.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_map::ChainedHashMap;
    ///
    /// let mut map: ChainedHashMap<&str, &str> = ChainedHashMap::new(5);
    ///
    /// assert!(map.delete("Edmund").is_none());
    /// assert!(map.set("Edmund", "Chinese"));
    /// assert_eq!(map.delete("Edmund"), Some("Chinese"));
    /// assert!(map.delete("Edmund").is_none());
    /// ```
    #[inline]
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        self.delete_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the [`ChainedHashMap`], returning the stored key and value.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_map::ChainedHashMap;
    ///
    /// let mut map: ChainedHashMap<String, u32> = ChainedHashMap::new(1);
    ///
    /// assert!(map.set("one".to_owned(), 1));
    /// assert_eq!(map.delete_entry("one"), Some(("one".to_owned(), 1)));
    /// ```
    #[inline]
    pub fn delete_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        if self.is_empty() {
            return None;
        }
        let index = self.index_of(key);
        let Entry { key, val } = self.buckets[index].remove(key)?;
        self.len -= 1;
        trace!("removed an entry from bucket {index}, {} left", self.len);
        Some((key, val))
    }

    /// Returns the index of the bucket that holds the key, if it is present.
    ///
    /// Returns `None` if the capacity is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_map::ChainedHashMap;
    ///
    /// let map: ChainedHashMap<u64, u32> = ChainedHashMap::new(16);
    ///
    /// let bucket_index = map.bucket_index(&11);
    /// assert!(bucket_index.map_or(false, |i| i < map.capacity()));
    ///
    /// let map: ChainedHashMap<u64, u32> = ChainedHashMap::new(0);
    /// assert!(map.bucket_index(&11).is_none());
    /// ```
    #[inline]
    #[must_use]
    pub fn bucket_index<Q>(&self, key: &Q) -> Option<usize>
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        if self.capacity() == 0 {
            None
        } else {
            Some(self.index_of(key))
        }
    }

    /// Returns the hash value of the key.
    #[inline]
    fn hash<Q>(&self, key: &Q) -> u64
    where
        Q: Hash + ?Sized,
    {
        let mut h = self.build_hasher.build_hasher();
        key.hash(&mut h);
        h.finish()
    }

    /// Maps the key onto a bucket; the capacity must not be zero.
    #[allow(clippy::cast_possible_truncation)]
    #[inline]
    fn index_of<Q>(&self, key: &Q) -> usize
    where
        Q: Hash + ?Sized,
    {
        debug_assert_ne!(self.capacity(), 0);
        (self.hash(key) % self.capacity() as u64) as usize
    }
}

impl<K, V> ChainedHashMap<K, V, RandomState> {
    /// Creates an empty [`ChainedHashMap`] with `2 * size` buckets.
    ///
    /// A `size` of zero yields a map that cannot hold any entry.
    ///
    /// # Panics
    ///
    /// Panics if `2 * size` overflows `usize`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_map::ChainedHashMap;
    ///
    /// let mut map: ChainedHashMap<u64, u32> = ChainedHashMap::new(0);
    ///
    /// assert_eq!(map.capacity(), 0);
    /// assert!(!map.set(1, 1));
    /// ```
    #[inline]
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self::with_hasher(size, RandomState::new())
    }
}

impl<K, V, H> Clone for ChainedHashMap<K, V, H>
where
    K: Clone,
    V: Clone,
    H: BuildHasher + Clone,
{
    #[inline]
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            len: self.len,
            build_hasher: self.build_hasher.clone(),
        }
    }
}

impl<K, V, H> Debug for ChainedHashMap<K, V, H>
where
    K: Debug,
    V: Debug,
    H: BuildHasher,
{
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, H> Default for ChainedHashMap<K, V, H>
where
    H: BuildHasher + Default,
{
    /// Creates a [`ChainedHashMap`] without buckets.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_map::ChainedHashMap;
    ///
    /// let map: ChainedHashMap<u64, u32> = ChainedHashMap::default();
    ///
    /// assert_eq!(map.capacity(), 0);
    /// assert_eq!(map.load(), None);
    /// ```
    #[inline]
    fn default() -> Self {
        Self::with_hasher(0, H::default())
    }
}

impl<K, V, H> PartialEq for ChainedHashMap<K, V, H>
where
    K: Eq + Hash,
    V: PartialEq,
    H: BuildHasher,
{
    /// Compares the entries of two [`ChainedHashMap`] instances; capacities are not compared.
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, H> Eq for ChainedHashMap<K, V, H>
where
    K: Eq + Hash,
    V: Eq,
    H: BuildHasher,
{
}

impl<'m, K, V, H> IntoIterator for &'m ChainedHashMap<K, V, H>
where
    H: BuildHasher,
{
    type Item = (&'m K, &'m V);
    type IntoIter = Iter<'m, K, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'m, K, V> Iterator for Iter<'m, K, V> {
    type Item = (&'m K, &'m V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.chain.next() {
                self.remaining -= 1;
                return Some((&entry.key, &entry.val));
            }
            self.chain = self.buckets.next()?.iter();
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            chain: self.chain.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K, V> Debug for Iter<'_, K, V>
where
    K: Debug,
    V: Debug,
{
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
