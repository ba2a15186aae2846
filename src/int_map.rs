use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::slice::ChunksExact;

use crate::capacity::Capacity;
use crate::config::DEFAULT_EXPECTED;
use crate::config::DEFAULT_FILL_FACTOR;
use crate::error::Error;
use crate::error::Result;
use crate::hash::scramble;

/// Key value marking an empty slot.
const EMPTY: u64 = 0;

/// Probe-length statistics for table analysis.
///
/// Available in tests or with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of live entries
    pub len: usize,
    /// Entry count that triggers the next resize
    pub threshold: usize,
    /// Number of slot pairs allocated
    pub capacity: usize,
    /// Number of slot pairs currently occupied
    pub occupied_slots: usize,
    /// Load factor (len / capacity)
    pub load_factor: f64,
    /// Largest distance, in pairs, of any entry from its home slot
    pub max_probe_length: usize,
    /// Mean distance, in pairs, of entries from their home slots
    pub mean_probe_length: f64,
    /// Total memory in bytes used by the slot storage
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== IntMap Debug Statistics ===");
        println!(
            "Population: {}/{} (threshold {}, {:.2}% load factor)",
            self.len,
            self.capacity,
            self.threshold,
            self.load_factor * 100.0
        );
        println!(
            "Probe length: max {}, mean {:.3}",
            self.max_probe_length, self.mean_probe_length
        );
        println!("Occupied slots: {}", self.occupied_slots);
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// A hash map from non-zero `u64` keys to `u64` values.
///
/// Entries live in a single flat `Vec<u64>` of interleaved keys and values,
/// indexed by linear probing from a scrambled home slot. Removal uses
/// backward-shift deletion, so no tombstones are ever left behind and probe
/// chains stay as short as the current contents allow.
///
/// The key `0` marks empty slots and cannot be stored.
///
/// ## Performance Characteristics
///
/// - **Memory**: 16 bytes per slot; at most `fill_factor` of the slots are
///   occupied before the table doubles.
/// - **Growth**: doubling reinserts every entry, so a single insert may take
///   O(n). Size the map up front with [`IntMap::new`] or [`IntMap::reserve`]
///   to avoid it.
///
/// ## Example
///
/// ```rust
/// use phimap::IntMap;
///
/// let mut map = IntMap::new(100, 0.75)?;
/// map.insert(7, 49)?;
/// map.insert(8, 64)?;
///
/// assert_eq!(map.get(7), Some(49));
/// assert_eq!(map.remove(8), Some(64));
/// assert_eq!(map.get(8), None);
/// assert_eq!(map.len(), 1);
/// # Ok::<(), phimap::Error>(())
/// ```
#[derive(Clone)]
pub struct IntMap {
    slots: Vec<u64>,
    capacity: Capacity,
    fill_factor: f64,

    threshold: usize,
    len: usize,

    mask: u64,
    mask2: u64,
}

impl Debug for IntMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl PartialEq for IntMap {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().all(|(key, value)| other.get(key) == Some(value))
    }
}

impl Eq for IntMap {}

impl Default for IntMap {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_EXPECTED).expect("default sizing is valid")
    }
}

impl IntMap {
    /// Creates a map sized to hold `expected` entries before growing, using
    /// `fill_factor` as the occupancy at which the table doubles.
    ///
    /// Returns an error if `expected` is zero, if `fill_factor` is not
    /// strictly between 0 and 1, or if the sizing would need more than 2^31
    /// slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use phimap::Error;
    /// use phimap::IntMap;
    ///
    /// let map = IntMap::new(10, 0.6)?;
    /// assert_eq!(map.capacity(), 32);
    /// assert_eq!(map.threshold(), 19);
    ///
    /// assert_eq!(IntMap::new(10, 1.0), Err(Error::InvalidFillFactor(1.0)));
    /// assert_eq!(IntMap::new(0, 0.5), Err(Error::InvalidExpectedCount));
    /// # Ok::<(), phimap::Error>(())
    /// ```
    pub fn new(expected: usize, fill_factor: f64) -> Result<Self> {
        let capacity = Capacity::for_expected(expected, fill_factor)?;
        let map = Self {
            slots: vec![EMPTY; capacity.slots()],
            capacity,
            fill_factor,
            threshold: capacity.threshold(fill_factor),
            len: 0,
            mask: capacity.mask(),
            mask2: capacity.mask2(),
        };

        tracing::trace!(
            capacity = capacity.pairs(),
            threshold = map.threshold,
            fill_factor,
            "created map"
        );

        Ok(map)
    }

    /// Creates a map sized for `expected` entries with the default fill
    /// factor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use phimap::IntMap;
    ///
    /// let map = IntMap::with_capacity(100)?;
    /// assert!(map.threshold() >= 100);
    /// # Ok::<(), phimap::Error>(())
    /// ```
    pub fn with_capacity(expected: usize) -> Result<Self> {
        Self::new(expected, DEFAULT_FILL_FACTOR)
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the entry count at which the next insert of a new key will
    /// double the table.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Returns the number of slots in the table. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.capacity.pairs()
    }

    /// Returns the fill factor this map was created with.
    pub fn fill_factor(&self) -> f64 {
        self.fill_factor
    }

    /// Storage index of the first slot probed for `key`.
    #[inline(always)]
    fn home(&self, key: u64) -> usize {
        ((scramble(key) & self.mask) << 1) as usize
    }

    #[inline(always)]
    fn next(&self, index: usize) -> usize {
        ((index as u64 + 2) & self.mask2) as usize
    }

    /// Storage index of `key`, which must be non-zero.
    #[inline]
    fn find(&self, key: u64) -> Option<usize> {
        debug_assert_ne!(key, EMPTY);

        let mut index = self.home(key);
        loop {
            match self.slots[index] {
                EMPTY => return None,
                k if k == key => return Some(index),
                _ => index = self.next(index),
            }
        }
    }

    /// Returns the value stored for `key`.
    ///
    /// The zero key is never present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use phimap::IntMap;
    ///
    /// let mut map = IntMap::default();
    /// map.insert(3, 9)?;
    /// assert_eq!(map.get(3), Some(9));
    /// assert_eq!(map.get(4), None);
    /// assert_eq!(map.get(0), None);
    /// # Ok::<(), phimap::Error>(())
    /// ```
    #[inline]
    pub fn get(&self, key: u64) -> Option<u64> {
        if key == EMPTY {
            return None;
        }
        self.find(key).map(|index| self.slots[index + 1])
    }

    /// Returns a mutable reference to the value stored for `key`.
    pub fn get_mut(&mut self, key: u64) -> Option<&mut u64> {
        if key == EMPTY {
            return None;
        }
        let index = self.find(key)?;
        Some(&mut self.slots[index + 1])
    }

    /// Returns `true` if the map holds an entry for `key`.
    pub fn contains_key(&self, key: u64) -> bool {
        self.get(key).is_some()
    }

    /// Inserts a key-value pair, returning the previous value if `key` was
    /// already present.
    ///
    /// Inserting a new key while the map holds [`threshold`] entries doubles
    /// the table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] for the key `0`, which is reserved to mark
    /// empty slots. This is a contract violation on the caller's side; the
    /// map is left untouched.
    ///
    /// [`threshold`]: IntMap::threshold
    ///
    /// # Examples
    ///
    /// ```rust
    /// use phimap::Error;
    /// use phimap::IntMap;
    ///
    /// let mut map = IntMap::default();
    /// assert_eq!(map.insert(1, 10)?, None);
    /// assert_eq!(map.insert(1, 11)?, Some(10));
    /// assert_eq!(map.len(), 1);
    ///
    /// assert_eq!(map.insert(0, 1), Err(Error::InvalidKey));
    /// # Ok::<(), phimap::Error>(())
    /// ```
    pub fn insert(&mut self, key: u64, value: u64) -> Result<Option<u64>> {
        if key == EMPTY {
            return Err(Error::InvalidKey);
        }

        let mut index = self.home(key);
        loop {
            match self.slots[index] {
                EMPTY => {
                    self.slots[index] = key;
                    self.slots[index + 1] = value;
                    // The new pair is counted by the rehash.
                    if self.len >= self.threshold {
                        self.rehash();
                    } else {
                        self.len += 1;
                    }
                    return Ok(None);
                }
                k if k == key => {
                    return Ok(Some(core::mem::replace(&mut self.slots[index + 1], value)));
                }
                _ => index = self.next(index),
            }
        }
    }

    /// Removes `key` from the map, returning its value if it was present.
    ///
    /// Entries further along the probe chain are shifted back into the freed
    /// slot, so lookups for every other key keep working.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use phimap::IntMap;
    ///
    /// let mut map = IntMap::default();
    /// map.insert(5, 25)?;
    /// assert_eq!(map.remove(5), Some(25));
    /// assert_eq!(map.remove(5), None);
    /// assert_eq!(map.remove(0), None);
    /// # Ok::<(), phimap::Error>(())
    /// ```
    pub fn remove(&mut self, key: u64) -> Option<u64> {
        if key == EMPTY {
            return None;
        }

        let index = self.find(key)?;
        let value = self.slots[index + 1];
        self.shift_back(index);
        self.len -= 1;
        Some(value)
    }

    /// Closes the gap left at storage index `freed` by moving later chain
    /// entries backward, until an empty slot ends the run.
    fn shift_back(&mut self, freed: usize) {
        let mut last = freed;
        let mut pos = self.next(last);
        loop {
            let key = self.slots[pos];
            if key == EMPTY {
                self.slots[last] = EMPTY;
                self.slots[last + 1] = 0;
                return;
            }

            // An entry whose home lies in (last, pos] would become unreachable
            // if moved to `last`.
            let home = self.home(key);
            if in_cyclic_range(home, last, pos) {
                pos = self.next(pos);
                continue;
            }

            self.slots[last] = key;
            self.slots[last + 1] = self.slots[pos + 1];
            last = pos;
            pos = self.next(last);
        }
    }

    /// Removes every entry while keeping the allocated table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use phimap::IntMap;
    ///
    /// let mut map = IntMap::new(4, 0.5)?;
    /// for k in 1..=100 {
    ///     map.insert(k, k)?;
    /// }
    /// let capacity = map.capacity();
    ///
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), capacity);
    /// # Ok::<(), phimap::Error>(())
    /// ```
    pub fn clear(&mut self) {
        self.slots.fill(EMPTY);
        self.len = 0;
        tracing::trace!(capacity = self.capacity.pairs(), "cleared map");
    }

    /// Grows the table so that `additional` more keys can be inserted without
    /// triggering a resize. Never shrinks.
    ///
    /// # Panics
    ///
    /// Panics if the required slot count overflows `usize`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use phimap::IntMap;
    ///
    /// let mut map = IntMap::new(1, 0.5)?;
    /// map.reserve(1000);
    /// let capacity = map.capacity();
    /// for k in 1..=1000 {
    ///     map.insert(k, k)?;
    /// }
    /// assert_eq!(map.capacity(), capacity);
    /// # Ok::<(), phimap::Error>(())
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        let needed = self.len.saturating_add(additional);
        let mut target = self.capacity;
        while target.threshold(self.fill_factor) < needed {
            target = target.doubled();
        }

        if target != self.capacity {
            self.resize(target);
        }
    }

    #[cold]
    fn rehash(&mut self) {
        self.resize(self.capacity.doubled());
    }

    /// Moves every entry into a fresh table of `capacity` slots, recounting
    /// `len` along the way.
    fn resize(&mut self, capacity: Capacity) {
        let old_capacity = self.capacity.pairs();

        self.capacity = capacity;
        self.threshold = capacity.threshold(self.fill_factor);
        self.mask = capacity.mask();
        self.mask2 = capacity.mask2();

        let old_slots = core::mem::replace(&mut self.slots, vec![EMPTY; capacity.slots()]);
        self.len = 0;
        for pair in old_slots.chunks_exact(2) {
            if pair[0] != EMPTY {
                self.place(pair[0], pair[1]);
                self.len += 1;
            }
        }

        tracing::debug!(
            old_capacity,
            new_capacity = capacity.pairs(),
            len = self.len,
            "resized map"
        );
    }

    /// Writes a key known to be absent into the first free slot of its chain.
    #[inline]
    fn place(&mut self, key: u64, value: u64) {
        let mut index = self.home(key);
        while self.slots[index] != EMPTY {
            debug_assert_ne!(self.slots[index], key);
            index = self.next(index);
        }
        self.slots[index] = key;
        self.slots[index + 1] = value;
    }

    /// Returns an iterator over all `(key, value)` pairs in slot order.
    ///
    /// The order is unspecified and changes when the table grows.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use phimap::IntMap;
    ///
    /// let mut map = IntMap::default();
    /// map.insert(1, 2)?;
    /// map.insert(3, 4)?;
    ///
    /// let mut pairs: Vec<(u64, u64)> = map.iter().collect();
    /// pairs.sort();
    /// assert_eq!(pairs, vec![(1, 2), (3, 4)]);
    /// # Ok::<(), phimap::Error>(())
    /// ```
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            pairs: self.slots.chunks_exact(2),
            remaining: self.len,
        }
    }

    /// Returns an iterator over the keys of the map.
    pub fn keys(&self) -> Keys<'_> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map.
    pub fn values(&self) -> Values<'_> {
        Values { inner: self.iter() }
    }

    /// Calls `visit` for each entry until it returns `false`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use phimap::IntMap;
    ///
    /// let mut map = IntMap::default();
    /// for k in 1..=10 {
    ///     map.insert(k, k)?;
    /// }
    ///
    /// let mut seen = 0;
    /// map.visit(|_, _| {
    ///     seen += 1;
    ///     seen < 3
    /// });
    /// assert_eq!(seen, 3);
    /// # Ok::<(), phimap::Error>(())
    /// ```
    pub fn visit(&self, mut visit: impl FnMut(u64, u64) -> bool) {
        for (key, value) in self.iter() {
            if !visit(key, value) {
                return;
            }
        }
    }

    /// Distance in pairs from the home slot of the entry at storage `index`.
    #[cfg(any(test, feature = "stats"))]
    fn displacement(&self, index: usize) -> usize {
        let home = self.home(self.slots[index]) / 2;
        (index / 2).wrapping_sub(home) & self.mask as usize
    }

    /// Computes a histogram of probe lengths for the current table state.
    ///
    /// Index `d` of the result counts entries stored `d` slots past their
    /// home slot. The vector is as long as the largest displacement plus one.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> Vec<usize> {
        let mut hist = Vec::new();
        for index in (0..self.slots.len()).step_by(2) {
            if self.slots[index] == EMPTY {
                continue;
            }
            let distance = self.displacement(index);
            if hist.len() <= distance {
                hist.resize(distance + 1, 0);
            }
            hist[distance] += 1;
        }
        hist
    }

    /// Returns sizing and probe-length statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let hist = self.probe_histogram();
        let occupied_slots = hist.iter().sum::<usize>();
        let total_probe = hist
            .iter()
            .enumerate()
            .map(|(distance, count)| distance * count)
            .sum::<usize>();

        DebugStats {
            len: self.len,
            threshold: self.threshold,
            capacity: self.capacity.pairs(),
            occupied_slots,
            load_factor: self.len as f64 / self.capacity.pairs() as f64,
            max_probe_length: hist.len().saturating_sub(1),
            mean_probe_length: if occupied_slots == 0 {
                0.0
            } else {
                total_probe as f64 / occupied_slots as f64
            },
            total_bytes: self.slots.len() * core::mem::size_of::<u64>(),
        }
    }

    /// Pretty-prints the probe-length histogram horizontally using stdout.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_probe_histogram(&self) {
        let hist = self.probe_histogram();
        let max = *hist.iter().max().unwrap_or(&0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!("probe histogram ({} entries):", self.len);
        for (distance, &count) in hist.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>3} | {} ({})", distance, "█".repeat(width), count);
        }
    }
}

/// Whether `slot` lies in the circular interval `(last, pos]`.
#[inline(always)]
fn in_cyclic_range(slot: usize, last: usize, pos: usize) -> bool {
    if last <= pos {
        last < slot && slot <= pos
    } else {
        last < slot || slot <= pos
    }
}

impl<'a> IntoIterator for &'a IntMap {
    type Item = (u64, u64);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the entries of an [`IntMap`].
///
/// This struct is created by the [`iter`] method on [`IntMap`]. It yields
/// `(key, value)` pairs in slot order.
///
/// [`iter`]: IntMap::iter
#[derive(Clone)]
pub struct Iter<'a> {
    pairs: ChunksExact<'a, u64>,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = (u64, u64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for pair in &mut self.pairs {
            if pair[0] != EMPTY {
                self.remaining -= 1;
                return Some((pair[0], pair[1]));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

/// An iterator over the keys of an [`IntMap`].
///
/// This struct is created by the [`keys`](IntMap::keys) method.
#[derive(Clone)]
pub struct Keys<'a> {
    inner: Iter<'a>,
}

impl Iterator for Keys<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Keys<'_> {}

/// An iterator over the values of an [`IntMap`].
///
/// This struct is created by the [`values`](IntMap::values) method.
#[derive(Clone)]
pub struct Values<'a> {
    inner: Iter<'a>,
}

impl Iterator for Values<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Values<'_> {}
