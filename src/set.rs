//! A fixed-capacity set of fixed-width byte entries.
//!
//! This is the core probe engine of the crate. [`SwissSet`] stores
//! opaque byte strings of a width chosen at construction and supports
//! exactly two operations: insert-if-absent and membership test. The
//! caller supplies the 64-bit hash for each operation, which keeps the
//! engine independent of any particular hash function; [`crate::xxhash`]
//! provides a suitable one.
//!
//! ## Design
//!
//! The table is two contiguous buffers allocated once at construction: a
//! control array of one byte per slot and a flat value array of
//! `entry_size` bytes per slot. A control byte is `0x00` for an empty
//! slot or `0x80..=0xFF` for an occupied one, where the low 7 bits carry
//! a tag derived from the entry's hash. The hash is split so the tag and
//! the starting bucket come from disjoint bits: the tag from the low 7
//! bits, the bucket from bits 7 and up. Deriving both from the same bits
//! would correlate group selection with in-group matching and inflate
//! tag collisions.
//!
//! Lookups load a whole group of control bytes at the current bucket and
//! compare them against the tag in one SIMD or SWAR operation (see
//! [`crate::group`]). Tag hits are verified against entry storage in
//! ascending position order. A group containing an empty byte ends the
//! probe: entries are never removed, so an empty byte proves the key was
//! never displaced past it. If the group is full and has no match, the
//! probe advances by triangular strides at group granularity, which
//! visits every group of a power-of-two table exactly once.
//!
//! The first group-width control bytes are mirrored past the end of the
//! control array, so a group load starting anywhere in the table reads a
//! contiguous, logically wrapped view without branch or split-load
//! handling. Inserts into the mirrored head region write both copies.
//!
//! Capacity is planned at construction as the smallest power of two that
//! keeps the configured load factor at `max_size` entries, and never
//! changes. The load factor guarantees empty slots exist in the whole
//! table, so probes terminate. There is no removal and no resizing, so
//! there are no tombstones and no rehashing protocol.

use alloc::boxed::Box;
use alloc::vec;
use core::fmt::Debug;
use core::marker::PhantomData;

use crate::error::Error;
use crate::group::DefaultGroup;
use crate::group::Group;

/// Load factor used when none is given: 7/8 full at maximum size.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.875;

/// Tables with this many slots or more are rejected at construction.
pub(crate) const MAX_CAPACITY: u64 = 1 << 30;

/// Plans the slot count for a table expected to hold `max_size` entries
/// at the given load factor: the smallest power of two that is at least
/// the group width and at least `max_size / load_factor`.
pub(crate) fn plan_capacity(
    group_width: usize,
    max_size: usize,
    load_factor: f64,
) -> Result<usize, Error> {
    debug_assert!(max_size > 0);
    debug_assert!(load_factor > 0.0 && load_factor <= 1.0);

    // Ceiling of `max_size / load_factor`. `f64::ceil` lives in std, so
    // round up by comparing the truncated quotient against the exact one.
    let scaled = max_size as f64 / load_factor;
    let mut needed = scaled as u64;
    if (needed as f64) < scaled {
        needed += 1;
    }

    let needed = needed.max(group_width as u64);
    if needed >= MAX_CAPACITY {
        return Err(Error::InvalidArgument("capacity would reach 2^30 slots"));
    }

    let capacity = needed.next_power_of_two();
    if capacity >= MAX_CAPACITY {
        return Err(Error::InvalidArgument("capacity would reach 2^30 slots"));
    }

    Ok(capacity as usize)
}

/// Occupancy tag for a hash: the low 7 bits with the high bit forced on,
/// so a tag can never equal the empty sentinel.
#[inline(always)]
pub(crate) fn control_tag(hash: u64) -> u8 {
    (hash & 0x7F) as u8 | 0x80
}

/// Starting bucket for a hash: bits 7 and up, reduced by the table mask.
#[inline(always)]
pub(crate) fn start_bucket(hash: u64, mask: usize) -> usize {
    (hash >> 7) as usize & mask
}

/// A fixed-capacity, insert-only set of fixed-width byte entries.
///
/// Entry equality is bytewise over the full width. The caller supplies a
/// 64-bit hash with every operation; the same entry must always be
/// presented with the same hash, and hashes should be well distributed
/// in their low bits.
///
/// The matcher backend `G` is selected at construction.
/// [`SwissSet::new`] uses [`DefaultGroup`]; use
/// [`SwissSet::with_group`] to pick a specific backend.
///
/// # Examples
///
/// ```rust
/// use swiss_set::SwissSet;
/// use swiss_set::xxhash;
///
/// let mut set = SwissSet::new(4, 100).unwrap();
///
/// let entry = [1u8, 2, 3, 4];
/// let hash = xxhash::hash(&entry);
/// assert!(set.insert(hash, &entry).unwrap());
/// assert!(!set.insert(hash, &entry).unwrap());
/// assert!(set.contains(hash, &entry).unwrap());
/// ```
pub struct SwissSet<G: Group = DefaultGroup> {
    ctrl: Box<[u8]>,
    vals: Box<[u8]>,

    capacity: usize,
    mask: usize,

    size: usize,
    max_size: usize,
    entry_size: usize,

    _group: PhantomData<G>,
}

impl SwissSet {
    /// Creates a set for `max_size` entries of `entry_size` bytes each,
    /// with the default load factor of 7/8.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `entry_size` or `max_size`
    /// is zero, or if the planned capacity would reach `2^30` slots.
    pub fn new(entry_size: usize, max_size: usize) -> Result<Self, Error> {
        Self::with_group(entry_size, max_size)
    }

    /// Creates a set with an explicit load factor in `(0, 1]`.
    ///
    /// Lower load factors trade memory for shorter probe sequences.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `entry_size` or `max_size`
    /// is zero, if `load_factor` is outside `(0, 1]`, or if the planned
    /// capacity would reach `2^30` slots.
    pub fn with_load_factor(
        entry_size: usize,
        max_size: usize,
        load_factor: f64,
    ) -> Result<Self, Error> {
        Self::with_group_and_load_factor(entry_size, max_size, load_factor)
    }
}

impl<G: Group> SwissSet<G> {
    /// Creates a set probing with the matcher backend `G` and the
    /// default load factor.
    ///
    /// # Errors
    ///
    /// Same conditions as [`SwissSet::new`].
    pub fn with_group(entry_size: usize, max_size: usize) -> Result<Self, Error> {
        Self::with_group_and_load_factor(entry_size, max_size, DEFAULT_LOAD_FACTOR)
    }

    /// Creates a set probing with the matcher backend `G` and an
    /// explicit load factor.
    ///
    /// # Errors
    ///
    /// Same conditions as [`SwissSet::with_load_factor`].
    pub fn with_group_and_load_factor(
        entry_size: usize,
        max_size: usize,
        load_factor: f64,
    ) -> Result<Self, Error> {
        if entry_size == 0 {
            return Err(Error::InvalidArgument("entry size must be greater than zero"));
        }
        if max_size == 0 {
            return Err(Error::InvalidArgument("max size must be greater than zero"));
        }
        if !(load_factor > 0.0 && load_factor <= 1.0) {
            return Err(Error::InvalidArgument("load factor must be in (0, 1]"));
        }

        let capacity = plan_capacity(G::WIDTH, max_size, load_factor)?;
        let value_bytes = capacity
            .checked_mul(entry_size)
            .ok_or(Error::InvalidArgument("entry storage size overflows usize"))?;

        Ok(Self {
            ctrl: vec![0u8; capacity + G::WIDTH].into_boxed_slice(),
            vals: vec![0u8; value_bytes].into_boxed_slice(),
            capacity,
            mask: capacity - 1,
            size: 0,
            max_size,
            entry_size,
            _group: PhantomData,
        })
    }

    /// Returns the number of entries in the set.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the set contains no entries.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of slots in the table.
    ///
    /// Always a power of two, at least the group width, and strictly
    /// greater than [`SwissSet::max_size`] unless the load factor is 1.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the maximum number of entries the set accepts.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns the fixed width of entries in bytes.
    pub fn entry_size(&self) -> usize {
        self.entry_size
    }

    /// Adds an entry to the set if it is absent.
    ///
    /// Returns `true` if the entry was inserted and `false` if an equal
    /// entry was already present. Re-inserting a present entry succeeds
    /// even when the set is at maximum size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `entry` is not exactly
    /// `entry_size` bytes, and [`Error::CapacityExceeded`] if the entry
    /// is absent and the set already holds `max_size` entries.
    pub fn insert(&mut self, hash: u64, entry: &[u8]) -> Result<bool, Error> {
        self.check_width(entry)?;

        let tag = control_tag(hash);
        let mut bucket = start_bucket(hash, self.mask);
        let mut step = 1;

        // The triangular sequence visits every group once per `capacity`
        // steps. A table at load factor 1 can be completely full, with
        // no empty byte to stop the probe, so one full tour is the
        // bound.
        for _ in 0..self.capacity {
            // SAFETY: `bucket < capacity` and the control array extends
            // `G::WIDTH` mirrored bytes past `capacity`, so the group
            // load stays in bounds.
            let group = unsafe { G::load(self.ctrl.as_ptr().add(bucket)) };

            for position in group.match_tag(tag) {
                let slot = (bucket + position) & self.mask;
                if self.entry_at(slot) == entry {
                    return Ok(false);
                }
            }

            let empty = group.first_empty();
            if empty != G::WIDTH {
                // The full check happens only once a new key is known to
                // be absent, so duplicates keep succeeding at max size.
                if self.size == self.max_size {
                    return Err(Error::CapacityExceeded);
                }

                let slot = (bucket + empty) & self.mask;
                self.write(slot, tag, entry);
                self.size += 1;
                return Ok(true);
            }

            bucket = (bucket + step) & self.mask;
            step += G::WIDTH;
        }

        // Every group was probed without a match or an empty slot: the
        // table is completely full and the entry is absent.
        Err(Error::CapacityExceeded)
    }

    /// Returns `true` if the set contains an entry equal to `entry`.
    ///
    /// Never mutates the set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `entry` is not exactly
    /// `entry_size` bytes.
    pub fn contains(&self, hash: u64, entry: &[u8]) -> Result<bool, Error> {
        self.check_width(entry)?;

        let tag = control_tag(hash);
        let mut bucket = start_bucket(hash, self.mask);
        let mut step = 1;

        // Bounded for the same reason as `insert`: a completely full
        // table has no empty byte to stop the probe.
        for _ in 0..self.capacity {
            // SAFETY: `bucket < capacity` and the control array extends
            // `G::WIDTH` mirrored bytes past `capacity`, so the group
            // load stays in bounds.
            let group = unsafe { G::load(self.ctrl.as_ptr().add(bucket)) };

            for position in group.match_tag(tag) {
                let slot = (bucket + position) & self.mask;
                if self.entry_at(slot) == entry {
                    return Ok(true);
                }
            }

            if group.first_empty() != G::WIDTH {
                return Ok(false);
            }

            bucket = (bucket + step) & self.mask;
            step += G::WIDTH;
        }

        Ok(false)
    }

    /// Removes all entries from the set, preserving its capacity.
    ///
    /// All control bytes, including the mirrored tail, are reset to
    /// empty. Entry storage is left as is; probes never read a slot
    /// whose control byte is empty.
    pub fn clear(&mut self) {
        self.ctrl.fill(0);
        self.size = 0;
    }

    #[inline(always)]
    fn check_width(&self, entry: &[u8]) -> Result<(), Error> {
        if entry.len() != self.entry_size {
            return Err(Error::InvalidArgument("entry width does not match the set"));
        }
        Ok(())
    }

    #[inline(always)]
    fn entry_at(&self, slot: usize) -> &[u8] {
        let start = slot * self.entry_size;
        // SAFETY: `slot < capacity` because it is reduced by `mask`, and
        // `vals` holds `capacity * entry_size` bytes.
        unsafe { self.vals.get_unchecked(start..start + self.entry_size) }
    }

    #[inline(always)]
    fn write(&mut self, slot: usize, tag: u8, entry: &[u8]) {
        self.ctrl[slot] = tag;
        if slot < G::WIDTH {
            self.ctrl[self.capacity + slot] = tag;
        }

        let start = slot * self.entry_size;
        self.vals[start..start + self.entry_size].copy_from_slice(entry);
    }
}

impl<G: Group> Debug for SwissSet<G> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let occupied = self.ctrl[..self.capacity]
            .iter()
            .filter(|&&b| b != 0)
            .count();
        f.debug_struct("SwissSet")
            .field("entry_size", &self.entry_size)
            .field("size", &self.size)
            .field("max_size", &self.max_size)
            .field("capacity", &self.capacity)
            .field("occupied_slots", &occupied)
            .finish()
    }
}
