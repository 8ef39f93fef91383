//! A fixed-capacity set of 64-bit integers.
//!
//! [`U64SwissSet`] runs the same probe engine as [`crate::set::SwissSet`]
//! over typed storage: values live in a `u64` array and are compared as
//! integers instead of byte strings, and the hash is derived internally
//! with [`crate::xxhash`] rather than supplied by the caller. Hashing a
//! value's little-endian bytes keeps placement identical to inserting
//! those bytes into an 8-byte-entry [`SwissSet`](crate::set::SwissSet)
//! with the same hash, which the tests rely on.

use alloc::boxed::Box;
use alloc::vec;
use core::fmt::Debug;
use core::marker::PhantomData;

use crate::error::Error;
use crate::group::DefaultGroup;
use crate::group::Group;
use crate::set::control_tag;
use crate::set::plan_capacity;
use crate::set::start_bucket;
use crate::set::DEFAULT_LOAD_FACTOR;
use crate::xxhash;

/// A fixed-capacity, insert-only set of 64-bit integers.
///
/// Unlike [`SwissSet`](crate::set::SwissSet), values are hashed
/// internally and stored as integers, so lookups compare one word
/// instead of a byte slice.
///
/// # Examples
///
/// ```rust
/// use swiss_set::U64SwissSet;
///
/// let mut set = U64SwissSet::new(100).unwrap();
/// assert!(set.insert(42).unwrap());
/// assert!(!set.insert(42).unwrap());
/// assert!(set.contains(42));
/// assert!(!set.contains(43));
/// ```
pub struct U64SwissSet<G: Group = DefaultGroup> {
    ctrl: Box<[u8]>,
    vals: Box<[u64]>,

    capacity: usize,
    mask: usize,

    size: usize,
    max_size: usize,

    _group: PhantomData<G>,
}

impl U64SwissSet {
    /// Creates a set for `max_size` values with the default load factor
    /// of 7/8.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `max_size` is zero or the
    /// planned capacity would reach `2^30` slots.
    pub fn new(max_size: usize) -> Result<Self, Error> {
        Self::with_group(max_size)
    }

    /// Creates a set with an explicit load factor in `(0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `max_size` is zero, if
    /// `load_factor` is outside `(0, 1]`, or if the planned capacity
    /// would reach `2^30` slots.
    pub fn with_load_factor(max_size: usize, load_factor: f64) -> Result<Self, Error> {
        Self::with_group_and_load_factor(max_size, load_factor)
    }
}

impl<G: Group> U64SwissSet<G> {
    /// Creates a set probing with the matcher backend `G` and the
    /// default load factor.
    pub fn with_group(max_size: usize) -> Result<Self, Error> {
        Self::with_group_and_load_factor(max_size, DEFAULT_LOAD_FACTOR)
    }

    /// Creates a set probing with the matcher backend `G` and an
    /// explicit load factor.
    pub fn with_group_and_load_factor(max_size: usize, load_factor: f64) -> Result<Self, Error> {
        if max_size == 0 {
            return Err(Error::InvalidArgument("max size must be greater than zero"));
        }
        if !(load_factor > 0.0 && load_factor <= 1.0) {
            return Err(Error::InvalidArgument("load factor must be in (0, 1]"));
        }

        let capacity = plan_capacity(G::WIDTH, max_size, load_factor)?;

        Ok(Self {
            ctrl: vec![0u8; capacity + G::WIDTH].into_boxed_slice(),
            vals: vec![0u64; capacity].into_boxed_slice(),
            capacity,
            mask: capacity - 1,
            size: 0,
            max_size,
            _group: PhantomData,
        })
    }

    /// Returns the number of values in the set.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the set contains no values.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of slots in the table.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the maximum number of values the set accepts.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Adds a value to the set if it is absent.
    ///
    /// Returns `true` if the value was inserted and `false` if it was
    /// already present. Re-inserting a present value succeeds even when
    /// the set is at maximum size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] if the value is absent and the
    /// set already holds `max_size` values.
    pub fn insert(&mut self, value: u64) -> Result<bool, Error> {
        let hash = xxhash::hash_u64(value);
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
                // SAFETY: `slot < capacity`, the length of `vals`.
                if unsafe { *self.vals.get_unchecked(slot) } == value {
                    return Ok(false);
                }
            }

            let empty = group.first_empty();
            if empty != G::WIDTH {
                if self.size == self.max_size {
                    return Err(Error::CapacityExceeded);
                }

                let slot = (bucket + empty) & self.mask;
                self.ctrl[slot] = tag;
                if slot < G::WIDTH {
                    self.ctrl[self.capacity + slot] = tag;
                }
                self.vals[slot] = value;
                self.size += 1;
                return Ok(true);
            }

            bucket = (bucket + step) & self.mask;
            step += G::WIDTH;
        }

        Err(Error::CapacityExceeded)
    }

    /// Returns `true` if the set contains `value`. Never mutates the
    /// set.
    pub fn contains(&self, value: u64) -> bool {
        let hash = xxhash::hash_u64(value);
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
                // SAFETY: `slot < capacity`, the length of `vals`.
                if unsafe { *self.vals.get_unchecked(slot) } == value {
                    return true;
                }
            }

            if group.first_empty() != G::WIDTH {
                return false;
            }

            bucket = (bucket + step) & self.mask;
            step += G::WIDTH;
        }

        false
    }

    /// Removes all values from the set, preserving its capacity.
    pub fn clear(&mut self) {
        self.ctrl.fill(0);
        self.size = 0;
    }
}

impl<G: Group> Debug for U64SwissSet<G> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("U64SwissSet")
            .field("size", &self.size)
            .field("max_size", &self.max_size)
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use rand::rngs::OsRng;
    use rand::TryRngCore;

    use crate::group::SwarGroup;
    use crate::set::SwissSet;

    use super::*;

    #[test]
    fn insert_and_contains() {
        let mut set = U64SwissSet::new(100).unwrap();
        for value in 0..100u64 {
            assert!(set.insert(value).unwrap());
        }
        for value in 0..100u64 {
            assert!(!set.insert(value).unwrap());
            assert!(set.contains(value));
        }
        assert_eq!(set.len(), 100);
        assert!(!set.contains(100));
        assert!(!set.contains(u64::MAX));
    }

    #[test]
    fn zero_is_an_ordinary_value() {
        // The empty sentinel lives in the control bytes, not the value
        // array, so 0 needs no special casing.
        let mut set = U64SwissSet::new(10).unwrap();
        assert!(!set.contains(0));
        assert!(set.insert(0).unwrap());
        assert!(set.contains(0));
        assert!(!set.insert(0).unwrap());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn full_set_rejects_new_values_only() {
        let mut set = U64SwissSet::new(5).unwrap();
        for value in 0..5u64 {
            assert!(set.insert(value).unwrap());
        }
        assert_eq!(set.insert(5), Err(Error::CapacityExceeded));
        assert_eq!(set.insert(3), Ok(false));
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut set = U64SwissSet::new(200).unwrap();
        for value in 0..100u64 {
            set.insert(value).unwrap();
        }
        set.clear();
        assert!(set.is_empty());
        for value in 0..100u64 {
            assert!(!set.contains(value));
        }
        for value in 100..200u64 {
            assert!(set.insert(value).unwrap());
        }
        assert_eq!(set.len(), 100);
        for value in 0..100u64 {
            assert!(!set.contains(value));
        }
        for value in 100..200u64 {
            assert!(set.contains(value));
        }
    }

    #[test]
    fn construction_rejects_bad_arguments() {
        assert!(U64SwissSet::new(0).is_err());
        assert!(U64SwissSet::with_load_factor(10, 0.0).is_err());
        assert!(U64SwissSet::with_load_factor(10, 1.1).is_err());
        assert!(U64SwissSet::new(1 << 30).is_err());
    }

    #[test]
    fn mirror_matches_after_wrapping_inserts() {
        let mut set: U64SwissSet<SwarGroup> = U64SwissSet::with_group(64).unwrap();
        let mut value = 0u64;
        while set.len() < 64 {
            set.insert(value).unwrap();
            value += 1;
        }
        for i in 0..SwarGroup::WIDTH {
            assert_eq!(set.ctrl[i], set.ctrl[set.capacity + i], "mirror broken at {i}");
        }
    }

    #[test]
    fn placement_matches_byte_entry_set() {
        // Inserting a value here and its little-endian bytes into an
        // 8-byte-entry SwissSet must agree on every insert result,
        // membership, and size: both hash the same bytes and share the
        // planner and probe sequence.
        let mut rng = OsRng;
        let mut typed = U64SwissSet::new(500).unwrap();
        let mut bytes = SwissSet::new(8, 500).unwrap();

        let mut values = Vec::new();
        while values.len() < 500 {
            let value = rng.try_next_u64().unwrap();
            let typed_inserted = typed.insert(value).unwrap();
            let entry = value.to_le_bytes();
            let bytes_inserted = bytes.insert(xxhash::hash(&entry), &entry).unwrap();
            assert_eq!(typed_inserted, bytes_inserted);
            if typed_inserted {
                values.push(value);
            }
        }

        assert_eq!(typed.len(), bytes.len());
        for value in values {
            let entry = value.to_le_bytes();
            assert!(typed.contains(value));
            assert!(bytes.contains(xxhash::hash(&entry), &entry).unwrap());
        }
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn random_values_are_all_reachable() {
        let mut rng = OsRng;
        let mut set = U64SwissSet::new(50_000).unwrap();
        let mut values = Vec::new();

        while values.len() < 50_000 {
            let value = rng.try_next_u64().unwrap();
            if set.insert(value).unwrap() {
                values.push(value);
            }
        }

        assert_eq!(set.len(), 50_000);
        for value in &values {
            assert!(set.contains(*value));
        }
    }
}
