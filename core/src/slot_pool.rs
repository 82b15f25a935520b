//! Fixed-capacity slot pool addressed by generation-tagged handles.
//!
//! [`SlotPool`] stores one record per slot and hands out typed handles. Its
//! capacity is decided once at construction and never grows; exhausting it is
//! a sizing bug that the caller reports as fatal.
//!
//! # Generations
//!
//! Each slot keeps a 16-bit generation. Allocation bumps it to
//! `max(1, (gen + 1) mod 2^16)` and stamps the new handle with it. Freeing a
//! slot does *not* bump the generation: an outstanding handle keeps matching
//! the slot until the slot is handed out again, at which point the old handle
//! turns stale.
//!
//! # Example
//!
//! ```
//! use lattice_core::define_handle;
//! use lattice_core::slot_pool::SlotPool;
//!
//! define_handle!(pub struct NameHandle, "name");
//!
//! let mut pool = SlotPool::<NameHandle, &str>::new(1);
//! let first = pool.alloc("albedo").unwrap();
//! assert_eq!(pool[first], "albedo");
//!
//! pool.free(first);
//! let second = pool.alloc("normal").unwrap();
//! assert_eq!(second.index(), first.index());
//! assert_eq!(second.generation(), first.generation() + 1);
//! assert!(pool.get(first).is_err());
//! ```

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use crate::handle::{Handle, SlotId, next_generation};
use crate::index_queue::IndexQueue;

/// Errors reported by [`SlotPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Every slot is in use.
    #[error("{kind} pool exhausted (capacity {capacity})")]
    Exhausted {
        /// Resource kind of the pool.
        kind: &'static str,
        /// Fixed pool capacity.
        capacity: usize,
    },
    /// The handle is null or its index lies outside the pool.
    #[error("invalid {kind} handle {raw:#010x}")]
    InvalidHandle {
        /// Resource kind of the pool.
        kind: &'static str,
        /// Packed handle value.
        raw: u32,
    },
    /// The slot was freed or reused since the handle was issued.
    #[error("stale {kind} handle {raw:#010x} (slot generation is {current})")]
    StaleHandle {
        /// Resource kind of the pool.
        kind: &'static str,
        /// Packed handle value.
        raw: u32,
        /// Generation currently stored in the slot.
        current: u16,
    },
}

#[derive(Debug)]
struct Slot<T> {
    generation: u16,
    value: Option<T>,
}

/// Fixed-capacity pool of `T` records addressed by handles of type `H`.
#[derive(Debug)]
pub struct SlotPool<H: Handle, T> {
    slots: Vec<Slot<T>>,
    free: IndexQueue,
    live: usize,
    _handle: PhantomData<H>,
}

impl<H: Handle, T> SlotPool<H, T> {
    /// Create a pool with `capacity` slots, all free.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`SlotId::MAX_SLOTS`].
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity <= SlotId::MAX_SLOTS,
            "{} pool capacity {capacity} exceeds the 16-bit index range",
            H::KIND
        );
        let slots = (0..capacity)
            .map(|_| Slot {
                generation: 0,
                value: None,
            })
            .collect();
        log::debug!("{} pool created with {capacity} slots", H::KIND);
        Self {
            slots,
            free: IndexQueue::seeded(capacity),
            live: 0,
            _handle: PhantomData,
        }
    }

    /// Store `value` in a free slot and return its handle.
    pub fn alloc(&mut self, value: T) -> Result<H, PoolError> {
        let Some(index) = self.free.pull() else {
            return Err(PoolError::Exhausted {
                kind: H::KIND,
                capacity: self.capacity(),
            });
        };
        let slot = &mut self.slots[index as usize];
        debug_assert!(slot.value.is_none(), "free queue yielded an occupied slot");
        slot.generation = next_generation(slot.generation);
        slot.value = Some(value);
        self.live += 1;
        Ok(H::from_slot(SlotId::new(index as u16, slot.generation)))
    }

    /// Release the slot addressed by `handle` and return its record.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not address a live record, or if the free
    /// queue overflows (which would mean the pool's accounting is broken).
    pub fn free(&mut self, handle: H) -> T {
        if let Err(err) = self.check(handle) {
            panic!("cannot free: {err}");
        }
        let index = handle.slot().index();
        let value = self.slots[index]
            .value
            .take()
            .unwrap_or_else(|| unreachable!("checked slot is occupied"));
        self.live -= 1;
        assert!(
            self.free.push(index as u32),
            "{} pool free queue overflow",
            H::KIND
        );
        value
    }

    /// Borrow the record addressed by `handle`.
    pub fn get(&self, handle: H) -> Result<&T, PoolError> {
        self.check(handle)?;
        Ok(self.slots[handle.slot().index()]
            .value
            .as_ref()
            .unwrap_or_else(|| unreachable!("checked slot is occupied")))
    }

    /// Mutably borrow the record addressed by `handle`.
    pub fn get_mut(&mut self, handle: H) -> Result<&mut T, PoolError> {
        self.check(handle)?;
        Ok(self.slots[handle.slot().index()]
            .value
            .as_mut()
            .unwrap_or_else(|| unreachable!("checked slot is occupied")))
    }

    /// Returns true if `handle` addresses a live record.
    pub fn contains(&self, handle: H) -> bool {
        self.check(handle).is_ok()
    }

    /// Compare the handle's generation with the one stored in its slot.
    ///
    /// Unlike [`contains`](Self::contains) this ignores occupancy: a handle
    /// to a freed slot keeps matching until the slot is reallocated.
    pub fn matches_generation(&self, handle: H) -> bool {
        let id = handle.slot();
        id.is_valid()
            && self
                .slots
                .get(id.index())
                .is_some_and(|slot| slot.generation == id.generation())
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns true if no record is live.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Fixed number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the next [`alloc`](Self::alloc) would fail.
    pub fn is_full(&self) -> bool {
        self.live == self.capacity()
    }

    /// Iterate over live records together with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (H::from_slot(SlotId::new(index as u16, slot.generation)), value))
        })
    }

    /// Iterate mutably over live records together with their handles.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (H, &mut T)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.value
                .as_mut()
                .map(|value| (H::from_slot(SlotId::new(index as u16, generation)), value))
        })
    }

    fn check(&self, handle: H) -> Result<(), PoolError> {
        let id = handle.slot();
        let Some(slot) = self.slots.get(id.index()).filter(|_| id.is_valid()) else {
            return Err(PoolError::InvalidHandle {
                kind: H::KIND,
                raw: id.raw(),
            });
        };
        if slot.generation != id.generation() || slot.value.is_none() {
            return Err(PoolError::StaleHandle {
                kind: H::KIND,
                raw: id.raw(),
                current: slot.generation,
            });
        }
        Ok(())
    }
}

impl<H: Handle, T> Index<H> for SlotPool<H, T> {
    type Output = T;

    /// Dereference a handle. A stale or null handle is a fatal contract
    /// violation.
    fn index(&self, handle: H) -> &T {
        match self.get(handle) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<H: Handle, T> IndexMut<H> for SlotPool<H, T> {
    fn index_mut(&mut self, handle: H) -> &mut T {
        match self.get_mut(handle) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}
