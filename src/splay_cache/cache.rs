use crate::arena::Handle;
use crate::splay_cache::tree::{InOrder, Tree};
use crate::splay_cache::Result;
use log::debug;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::iter::FromIterator;
use std::marker::PhantomData;
use std::result;

/// The number of nodes per arena chunk used by `SplayCache::new`.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Counters describing how a `SplayCache` has been used.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, serde_derive::Serialize, serde_derive::Deserialize,
)]
pub struct CacheStats {
    /// Number of calls to `find` or `get_or_insert_with` that found their key.
    pub hits: u64,
    /// Number of calls to `find` or `get_or_insert_with` that did not find their key.
    pub misses: u64,
    /// Total number of rotations performed while splaying hits to the root.
    pub rotations: u64,
}

impl CacheStats {
    /// Returns the fraction of lookups that were hits, or `0.0` if there were no lookups.
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// A memoization cache implemented using a splay tree.
///
/// Every successful `find` splays the found node to the root of the tree, so keys that are
/// requested often or recently are reached in fewer steps on the next lookup. Nothing is ever
/// evicted: the shape of the tree is the only thing the access pattern changes. Inserting a key
/// that is already present does nothing, so `insert` can be called blindly after a miss.
///
/// # Examples
///
/// ```
/// use splay_collections::splay_cache::SplayCache;
///
/// let mut cache = SplayCache::new();
/// cache.insert(0, 1);
/// cache.insert(3, 4);
///
/// assert_eq!(cache.find(&3), Some(&4));
/// assert_eq!(cache.root(), Some((&3, &4)));
/// assert_eq!(cache.find(&1), None);
///
/// assert!(!cache.insert(3, 5));
/// assert_eq!(cache.find(&3), Some(&4));
/// assert_eq!(cache.len(), 2);
/// ```
pub struct SplayCache<T, U> {
    tree: Tree<T, U>,
    stats: CacheStats,
}

impl<T, U> SplayCache<T, U> {
    /// Constructs a new, empty `SplayCache<T, U>` that allocates `DEFAULT_CHUNK_SIZE` nodes at a
    /// time.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_collections::splay_cache::SplayCache;
    ///
    /// let cache: SplayCache<u32, u32> = SplayCache::new();
    /// ```
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Constructs a new, empty `SplayCache<T, U>` whose nodes are allocated `chunk_size` at a
    /// time.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_collections::splay_cache::SplayCache;
    ///
    /// let cache: SplayCache<u32, u32> = SplayCache::with_chunk_size(64);
    /// ```
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        SplayCache {
            tree: Tree::new(chunk_size),
            stats: CacheStats::default(),
        }
    }

    /// Inserts a key-value pair into the cache. Returns `false` and leaves the cache untouched if
    /// the key already exists. Inserting does not splay the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_collections::splay_cache::SplayCache;
    ///
    /// let mut cache = SplayCache::new();
    /// assert!(cache.insert(1, 1));
    /// assert!(!cache.insert(1, 2));
    /// assert_eq!(cache.peek(&1), Some(&1));
    /// ```
    pub fn insert(&mut self, key: T, value: U) -> bool
    where
        T: Ord,
    {
        self.tree.insert(key, value).1
    }

    fn record_hit(&mut self, handle: Handle) {
        let rotations = self.tree.splay(handle);
        self.stats.hits += 1;
        self.stats.rotations += rotations as u64;
    }

    /// Returns a reference to the value associated with a particular key and splays its node to
    /// the root of the tree. Returns `None` and leaves the tree untouched if the key does not
    /// exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_collections::splay_cache::SplayCache;
    ///
    /// let mut cache = SplayCache::new();
    /// cache.insert(1, 1);
    /// cache.insert(2, 2);
    /// assert_eq!(cache.find(&2), Some(&2));
    /// assert_eq!(cache.root(), Some((&2, &2)));
    /// assert_eq!(cache.find(&0), None);
    /// ```
    pub fn find<V>(&mut self, key: &V) -> Option<&U>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        match self.tree.search(key) {
            Some(handle) => {
                self.record_hit(handle);
                Some(&self.tree.node(handle).value)
            },
            None => {
                self.stats.misses += 1;
                None
            },
        }
    }

    /// Returns a reference to the value associated with a key, computing and inserting it with
    /// `f` if it does not exist. A hit is splayed to the root like in `find`. A newly inserted
    /// node stays where it was attached.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_collections::splay_cache::SplayCache;
    ///
    /// let mut cache = SplayCache::new();
    /// assert_eq!(cache.get_or_insert_with(3, || 9), &9);
    /// assert_eq!(cache.get_or_insert_with(3, || 0), &9);
    /// assert_eq!(cache.stats().hits, 1);
    /// assert_eq!(cache.stats().misses, 1);
    /// ```
    pub fn get_or_insert_with<F>(&mut self, key: T, f: F) -> &U
    where
        T: Ord,
        F: FnOnce() -> U,
    {
        let handle = match self.tree.search(&key) {
            Some(handle) => {
                self.record_hit(handle);
                handle
            },
            None => {
                self.stats.misses += 1;
                self.tree.insert(key, f()).0
            },
        };
        &self.tree.node(handle).value
    }

    /// Returns a reference to the value associated with a particular key without splaying the
    /// tree. Peeking is not recorded in the stats.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_collections::splay_cache::SplayCache;
    ///
    /// let mut cache = SplayCache::new();
    /// cache.insert(1, 1);
    /// cache.insert(2, 2);
    /// assert_eq!(cache.peek(&2), Some(&2));
    /// assert_eq!(cache.root(), Some((&1, &1)));
    /// ```
    pub fn peek<V>(&self, key: &V) -> Option<&U>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree
            .search(key)
            .map(|handle| &self.tree.node(handle).value)
    }

    /// Checks if a key exists in the cache. Note that `contains_key` does not splay the tree in
    /// order to use a non-mutable reference.
    pub fn contains_key<V>(&self, key: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.search(key).is_some()
    }

    /// Returns the number of edges between the root and the node holding a particular key, or
    /// `None` if the key does not exist. Does not splay the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_collections::splay_cache::SplayCache;
    ///
    /// let mut cache = SplayCache::new();
    /// cache.insert(1, 1);
    /// cache.insert(2, 2);
    /// assert_eq!(cache.depth(&2), Some(1));
    /// cache.find(&2);
    /// assert_eq!(cache.depth(&2), Some(0));
    /// ```
    pub fn depth<V>(&self, key: &V) -> Option<usize>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.depth(key)
    }

    /// Returns the number of nodes on the longest path from the root to a leaf.
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Returns the key-value pair stored at the root of the tree.
    pub fn root(&self) -> Option<(&T, &U)> {
        self.tree.root().map(|handle| {
            let node = self.tree.node(handle);
            (&node.key, &node.value)
        })
    }

    /// Returns the number of elements in the cache.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears the cache, releasing every node at once. The stats are kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_collections::splay_cache::SplayCache;
    ///
    /// let mut cache = SplayCache::new();
    /// cache.insert(1, 1);
    /// cache.insert(2, 2);
    /// cache.clear();
    /// assert!(cache.is_empty());
    /// assert_eq!(cache.root(), None);
    /// ```
    pub fn clear(&mut self) {
        debug!("clearing splay cache with {} entries", self.len());
        self.tree.clear();
    }

    /// Returns the usage counters of the cache.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Resets every usage counter to zero.
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// Verifies the structure of the tree: keys are strictly increasing in order, every child
    /// points back to its parent, the root has no parent and every node is reachable from the
    /// root.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_collections::splay_cache::SplayCache;
    ///
    /// let mut cache: SplayCache<u32, u32> = (0..100).map(|key| (key, key)).collect();
    /// cache.find(&50);
    /// assert!(cache.check_invariants().is_ok());
    /// ```
    pub fn check_invariants(&self) -> Result<()>
    where
        T: Ord,
    {
        self.tree.check_invariants()
    }

    /// Returns an iterator over the cache. The iterator will yield key-value pairs using in-order
    /// traversal and does not splay the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_collections::splay_cache::SplayCache;
    ///
    /// let mut cache = SplayCache::new();
    /// cache.insert(2, 2);
    /// cache.insert(1, 1);
    ///
    /// let mut iterator = cache.iter();
    /// assert_eq!(iterator.next(), Some((&1, &1)));
    /// assert_eq!(iterator.next(), Some((&2, &2)));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<T, U> {
        Iter {
            tree: &self.tree,
            handles: self.tree.in_order(),
            remaining: self.len(),
        }
    }
}

/// An iterator for `SplayCache<T, U>`.
///
/// This iterator traverses the elements of the cache in-order and yields immutable references.
pub struct Iter<'a, T, U>
where
    T: 'a,
    U: 'a,
{
    tree: &'a Tree<T, U>,
    handles: InOrder<'a, T, U>,
    remaining: usize,
}

impl<'a, T, U> Iterator for Iter<'a, T, U>
where
    T: 'a,
    U: 'a,
{
    type Item = (&'a T, &'a U);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let handle = self.handles.next()?;
        self.remaining -= 1;
        let node = tree.node(handle);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T, U> ExactSizeIterator for Iter<'a, T, U> {}

impl<'a, T, U> IntoIterator for &'a SplayCache<T, U>
where
    T: 'a,
    U: 'a,
{
    type IntoIter = Iter<'a, T, U>;
    type Item = (&'a T, &'a U);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, U> Default for SplayCache<T, U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, U> fmt::Debug for SplayCache<T, U>
where
    T: fmt::Debug,
    U: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<T, U> PartialEq for SplayCache<T, U>
where
    T: PartialEq,
    U: PartialEq,
{
    fn eq(&self, other: &SplayCache<T, U>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T, U> Eq for SplayCache<T, U>
where
    T: Eq,
    U: Eq,
{
}

impl<T, U> Extend<(T, U)> for SplayCache<T, U>
where
    T: Ord,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (T, U)>,
    {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<T, U> FromIterator<(T, U)> for SplayCache<T, U>
where
    T: Ord,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (T, U)>,
    {
        let mut cache = SplayCache::new();
        cache.extend(iter);
        cache
    }
}

impl<T, U> Serialize for SplayCache<T, U>
where
    T: Serialize,
    U: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

struct SplayCacheVisitor<T, U> {
    marker: PhantomData<fn() -> SplayCache<T, U>>,
}

impl<'de, T, U> Visitor<'de> for SplayCacheVisitor<T, U>
where
    T: Deserialize<'de> + Ord,
    U: Deserialize<'de>,
{
    type Value = SplayCache<T, U>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut cache = SplayCache::new();
        while let Some((key, value)) = access.next_entry()? {
            cache.insert(key, value);
        }
        Ok(cache)
    }
}

impl<'de, T, U> Deserialize<'de> for SplayCache<T, U>
where
    T: Deserialize<'de> + Ord,
    U: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(SplayCacheVisitor {
            marker: PhantomData,
        })
    }
}
