//! # Lattice Core
//!
//! Allocation building blocks shared by the Lattice graphics runtime:
//!
//! - [`IndexQueue`] - bounded ring buffer of free slot indices
//! - [`SlotPool`] - fixed-capacity record storage addressed by generation-tagged handles
//! - [`define_handle!`] - typed handle newtypes so resource kinds cannot be mixed
//! - [`PassSet`] - growable bitset used for frame graph dependency masks

pub mod handle;
pub mod index_queue;
pub mod pass_set;
pub mod slot_pool;

pub use handle::{Handle, SlotId};
pub use index_queue::IndexQueue;
pub use pass_set::PassSet;
pub use slot_pool::{PoolError, SlotPool};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
