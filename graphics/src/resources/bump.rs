//! Linear bump allocator for uniform data.
//!
//! Uniform blocks are appended to a fixed CPU arena at aligned offsets and
//! mirrored to a GPU buffer of the same size at the same offsets. Two
//! allocators exist per context:
//!
//! - the *streaming* arena, rewound at the start of every frame
//! - the *dynamic* arena, rewound only on explicit request
//!
//! The returned offset is the dynamic uniform offset a draw binds with.
//!
//! # Example
//!
//! ```
//! use lattice_graphics::backend::{DummyBackend, GpuBackend};
//! use lattice_graphics::resources::BumpAllocator;
//! use lattice_graphics::types::{BufferDescriptor, BufferUsage, ResGroupUsage};
//!
//! let mut backend = DummyBackend::with_uniform_alignment(64);
//! let buffer = backend
//!     .create_buffer(&BufferDescriptor::new(1024, BufferUsage::UNIFORM))
//!     .unwrap();
//! let mut arena = BumpAllocator::new(ResGroupUsage::Streaming, buffer, 1024, 64).unwrap();
//!
//! assert_eq!(arena.push_data(&mut backend, &[1; 100]), 0);
//! assert_eq!(arena.push_data(&mut backend, &[2; 8]), 128);
//! arena.reset();
//! assert_eq!(arena.used(), 0);
//! ```

use crate::backend::{GpuBackend, GpuBuffer};
use crate::error::GraphicsError;
use crate::types::ResGroupUsage;

/// A linear allocator over a fixed uniform arena.
///
/// Overflowing the arena is a sizing bug and panics; there is no wrapping.
#[derive(Debug)]
pub struct BumpAllocator {
    usage: ResGroupUsage,
    buffer: GpuBuffer,
    arena: Vec<u8>,
    write_offset: u32,
    alignment: u32,
    high_water_mark: u32,
    reset_count: u64,
}

impl BumpAllocator {
    /// Create an allocator over `capacity` bytes mirrored into `buffer`.
    ///
    /// `buffer` must be at least `capacity` bytes long.
    pub fn new(
        usage: ResGroupUsage,
        buffer: GpuBuffer,
        capacity: u32,
        alignment: u32,
    ) -> Result<Self, GraphicsError> {
        if !alignment.is_power_of_two() {
            return Err(GraphicsError::InvalidParameter(format!(
                "alignment must be a power of 2, got {alignment}"
            )));
        }

        if capacity == 0 {
            return Err(GraphicsError::InvalidParameter(
                "uniform arena capacity cannot be zero".to_string(),
            ));
        }

        Ok(Self {
            usage,
            buffer,
            arena: vec![0; capacity as usize],
            write_offset: 0,
            alignment,
            high_water_mark: 0,
            reset_count: 0,
        })
    }

    /// Copy `data` into the arena at the next aligned offset and mirror it to
    /// the GPU buffer. Returns the offset.
    ///
    /// # Panics
    ///
    /// Panics if the arena cannot hold the data.
    pub fn push_data(&mut self, backend: &mut dyn GpuBackend, data: &[u8]) -> u32 {
        let offset = align_up(self.write_offset, self.alignment);
        let end = offset as usize + data.len();
        assert!(
            end <= self.arena.len(),
            "{:?} uniform arena overflow: {} bytes at offset {offset} exceed capacity {}",
            self.usage,
            data.len(),
            self.arena.len()
        );

        self.arena[offset as usize..end].copy_from_slice(data);
        backend.write_buffer(&self.buffer, u64::from(offset), data);

        self.write_offset = end as u32;
        self.high_water_mark = self.high_water_mark.max(self.write_offset);
        offset
    }

    /// Push a single plain-old-data value.
    pub fn push_value<T: bytemuck::Pod>(&mut self, backend: &mut dyn GpuBackend, value: &T) -> u32 {
        self.push_data(backend, bytemuck::bytes_of(value))
    }

    /// Rewind to the beginning of the arena.
    ///
    /// Offsets handed out before the reset become invalid.
    pub fn reset(&mut self) {
        if self.write_offset > 0 {
            self.reset_count += 1;
            self.write_offset = 0;
        }
    }

    /// Which arena this is.
    pub fn usage(&self) -> ResGroupUsage {
        self.usage
    }

    /// GPU buffer the arena is mirrored into.
    pub fn buffer(&self) -> &GpuBuffer {
        &self.buffer
    }

    /// CPU copy of the arena.
    pub fn arena(&self) -> &[u8] {
        &self.arena
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> u32 {
        self.arena.len() as u32
    }

    /// Bytes used since the last reset.
    pub fn used(&self) -> u32 {
        self.write_offset
    }

    /// Bytes left before the arena overflows (ignoring alignment padding).
    pub fn remaining(&self) -> u32 {
        self.capacity() - self.write_offset
    }

    /// Offset alignment.
    pub fn alignment(&self) -> u32 {
        self.alignment
    }

    /// Largest `used()` ever observed.
    pub fn high_water_mark(&self) -> u32 {
        self.high_water_mark
    }

    /// Number of non-empty resets.
    pub fn reset_count(&self) -> u64 {
        self.reset_count
    }

    /// Release the GPU mirror.
    pub(crate) fn destroy(self, backend: &mut dyn GpuBackend) {
        backend.destroy_buffer(self.buffer);
    }
}

/// Align a value up to the given alignment.
#[inline]
fn align_up(value: u32, alignment: u32) -> u32 {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyBackend;
    use crate::types::{BufferDescriptor, BufferUsage};

    fn create_arena(capacity: u32, alignment: u32) -> (DummyBackend, BumpAllocator) {
        let mut backend = DummyBackend::with_uniform_alignment(alignment);
        let buffer = backend
            .create_buffer(&BufferDescriptor::new(
                u64::from(capacity),
                BufferUsage::UNIFORM | BufferUsage::COPY_DST,
            ))
            .unwrap();
        let arena =
            BumpAllocator::new(ResGroupUsage::Streaming, buffer, capacity, alignment).unwrap();
        (backend, arena)
    }

    #[test]
    fn test_creation() {
        let (_, arena) = create_arena(4096, 256);
        assert_eq!(arena.capacity(), 4096);
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.remaining(), 4096);
        assert_eq!(arena.high_water_mark(), 0);
    }

    #[test]
    fn test_invalid_parameters() {
        let buffer = GpuBuffer::Dummy { id: 0 };
        assert!(BumpAllocator::new(ResGroupUsage::Dynamic, buffer.clone(), 1024, 48).is_err());
        assert!(BumpAllocator::new(ResGroupUsage::Dynamic, buffer, 0, 64).is_err());
    }

    #[test]
    fn test_offsets_are_aligned() {
        let (mut backend, mut arena) = create_arena(1024, 256);

        // 100 bytes at 0
        assert_eq!(arena.push_data(&mut backend, &[1; 100]), 0);
        assert_eq!(arena.used(), 100);

        // next allocation is aligned up from 100
        assert_eq!(arena.push_data(&mut backend, &[2; 50]), 256);
        assert_eq!(arena.used(), 306);
        assert_eq!(arena.high_water_mark(), 306);
    }

    #[test]
    fn test_gpu_mirror_matches_arena() {
        let (mut backend, mut arena) = create_arena(512, 64);
        arena.push_data(&mut backend, &[7; 10]);
        let offset = arena.push_value(&mut backend, &[1.0f32, 2.0, 3.0, 4.0]);
        assert_eq!(offset, 64);
        assert_eq!(
            backend.buffer_contents(arena.buffer()).unwrap(),
            arena.arena()
        );
        assert_eq!(&arena.arena()[64..68], &1.0f32.to_ne_bytes());
    }

    #[test]
    fn test_exact_fit() {
        let (mut backend, mut arena) = create_arena(512, 64);
        arena.push_data(&mut backend, &[0; 400]);
        // aligned offset 448 + 64 == capacity
        assert_eq!(arena.push_data(&mut backend, &[0; 64]), 448);
        assert_eq!(arena.remaining(), 0);
    }

    #[test]
    #[should_panic(expected = "uniform arena overflow")]
    fn test_overflow_panics() {
        let (mut backend, mut arena) = create_arena(512, 64);
        arena.push_data(&mut backend, &[0; 400]);
        arena.push_data(&mut backend, &[0; 200]);
    }

    #[test]
    fn test_reset() {
        let (mut backend, mut arena) = create_arena(512, 64);
        arena.push_data(&mut backend, &[0; 300]);
        arena.reset();
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.reset_count(), 1);
        assert_eq!(arena.high_water_mark(), 300);

        // empty reset is not counted
        arena.reset();
        assert_eq!(arena.reset_count(), 1);

        assert_eq!(arena.push_data(&mut backend, &[0; 16]), 0);
    }
}
