//! Generation-tagged handles.
//!
//! A handle packs a 16-bit slot index and a 16-bit generation into a `u32`:
//!
//! ```text
//!  31            16 15             0
//! +----------------+----------------+
//! |   generation   |     index      |
//! +----------------+----------------+
//! ```
//!
//! Generation `0` is never issued, so the raw value `0` always means
//! "no resource". Each resource kind gets its own newtype through
//! [`define_handle!`](crate::define_handle), which keeps e.g. a buffer handle
//! from being passed where a texture handle is expected.

/// Packed `{index, generation}` pair shared by all handle kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct SlotId(u32);

impl SlotId {
    /// The null id (generation 0).
    pub const INVALID: Self = Self(0);

    /// Largest number of slots addressable by a 16-bit index.
    pub const MAX_SLOTS: usize = u16::MAX as usize;

    /// Pack an index and a generation.
    pub const fn new(index: u16, generation: u16) -> Self {
        Self(((generation as u32) << 16) | index as u32)
    }

    /// Rebuild an id from its packed representation.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Packed representation.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Slot index.
    pub const fn index(self) -> usize {
        (self.0 & 0xffff) as usize
    }

    /// Generation tag.
    pub const fn generation(self) -> u16 {
        (self.0 >> 16) as u16
    }

    /// Returns true unless this is the null id.
    pub const fn is_valid(self) -> bool {
        self.generation() != 0
    }
}

/// Successor of a slot generation: wraps modulo 2^16 and skips 0.
pub const fn next_generation(generation: u16) -> u16 {
    match generation.wrapping_add(1) {
        0 => 1,
        next => next,
    }
}

/// Common interface of the typed handle newtypes.
pub trait Handle: Copy + Eq + std::hash::Hash + std::fmt::Debug {
    /// Human-readable resource kind, used in panic and log messages.
    const KIND: &'static str;

    /// Wrap a slot id.
    fn from_slot(id: SlotId) -> Self;

    /// The wrapped slot id.
    fn slot(self) -> SlotId;
}

/// Define a typed handle newtype around [`SlotId`].
///
/// ```
/// lattice_core::define_handle!(
///     /// Handle to a mesh.
///     pub struct MeshHandle, "mesh"
/// );
///
/// let handle = MeshHandle::INVALID;
/// assert!(!handle.is_valid());
/// ```
#[macro_export]
macro_rules! define_handle {
    ($(#[$meta:meta])* $vis:vis struct $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
        $vis struct $name($crate::handle::SlotId);

        impl $name {
            /// The null handle.
            pub const INVALID: Self = Self($crate::handle::SlotId::INVALID);

            /// Rebuild a handle from its packed `u32` form.
            pub const fn from_raw(raw: u32) -> Self {
                Self($crate::handle::SlotId::from_raw(raw))
            }

            /// Packed `u32` form.
            pub const fn raw(self) -> u32 {
                self.0.raw()
            }

            /// Slot index inside the owning pool.
            pub const fn index(self) -> usize {
                self.0.index()
            }

            /// Generation tag.
            pub const fn generation(self) -> u16 {
                self.0.generation()
            }

            /// Returns true unless this is the null handle.
            pub const fn is_valid(self) -> bool {
                self.0.is_valid()
            }
        }

        impl $crate::handle::Handle for $name {
            const KIND: &'static str = $kind;

            fn from_slot(id: $crate::handle::SlotId) -> Self {
                Self(id)
            }

            fn slot(self) -> $crate::handle::SlotId {
                self.0
            }
        }
    };
}
