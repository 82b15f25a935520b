//! Setup configuration for the graphics context.
//!
//! Every pool is fixed-size: capacities are decided once in
//! [`SetupDescriptor`] and never grow afterwards.

use crate::backend::BackendType;
use crate::error::GraphicsError;

/// Capacities and arena sizes handed to
/// [`GraphicsContext::setup`](crate::GraphicsContext::setup).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupDescriptor {
    /// Backend to create.
    pub backend: BackendType,
    /// Buffer pool capacity.
    pub max_buffers: usize,
    /// Texture pool capacity.
    pub max_textures: usize,
    /// Sampler pool capacity.
    pub max_samplers: usize,
    /// Shader pool capacity.
    pub max_shaders: usize,
    /// Pipeline pool capacity.
    pub max_pipelines: usize,
    /// Resource group layout pool capacity.
    pub max_res_group_layouts: usize,
    /// Resource group pool capacity.
    pub max_res_groups: usize,
    /// Maximum number of passes declared in a single frame.
    pub max_passes_per_frame: usize,
    /// Number of GPU queues passes are spread over.
    pub max_queues: usize,
    /// Size in bytes of the per-frame uniform arena.
    pub streaming_uniform_size: u32,
    /// Size in bytes of the persistent uniform arena.
    pub dynamic_uniform_size: u32,
}

impl Default for SetupDescriptor {
    fn default() -> Self {
        Self {
            backend: BackendType::default(),
            max_buffers: 128,
            max_textures: 128,
            max_samplers: 32,
            max_shaders: 32,
            max_pipelines: 64,
            max_res_group_layouts: 32,
            max_res_groups: 256,
            max_passes_per_frame: 64,
            max_queues: 2,
            streaming_uniform_size: 1 << 20,
            dynamic_uniform_size: 256 << 10,
        }
    }
}

impl SetupDescriptor {
    /// Upper bound for any pool capacity (16-bit slot index).
    pub const MAX_POOL_CAPACITY: usize = lattice_core::SlotId::MAX_SLOTS;

    /// Set the backend.
    pub fn with_backend(mut self, backend: BackendType) -> Self {
        self.backend = backend;
        self
    }

    /// Set the buffer pool capacity.
    pub fn with_max_buffers(mut self, count: usize) -> Self {
        self.max_buffers = count;
        self
    }

    /// Set the texture pool capacity.
    pub fn with_max_textures(mut self, count: usize) -> Self {
        self.max_textures = count;
        self
    }

    /// Set the resource group pool capacity.
    pub fn with_max_res_groups(mut self, count: usize) -> Self {
        self.max_res_groups = count;
        self
    }

    /// Set the per-frame pass budget.
    pub fn with_max_passes(mut self, count: usize) -> Self {
        self.max_passes_per_frame = count;
        self
    }

    /// Set the number of GPU queues.
    pub fn with_max_queues(mut self, count: usize) -> Self {
        self.max_queues = count;
        self
    }

    /// Set both uniform arena sizes.
    pub fn with_uniform_sizes(mut self, streaming: u32, dynamic: u32) -> Self {
        self.streaming_uniform_size = streaming;
        self.dynamic_uniform_size = dynamic;
        self
    }

    /// Check that every capacity is usable.
    pub fn validate(&self) -> Result<(), GraphicsError> {
        let pools = [
            ("max_buffers", self.max_buffers),
            ("max_textures", self.max_textures),
            ("max_samplers", self.max_samplers),
            ("max_shaders", self.max_shaders),
            ("max_pipelines", self.max_pipelines),
            ("max_res_group_layouts", self.max_res_group_layouts),
            ("max_res_groups", self.max_res_groups),
        ];
        for (name, capacity) in pools {
            if capacity > Self::MAX_POOL_CAPACITY {
                return Err(GraphicsError::InvalidParameter(format!(
                    "{name} is {capacity}, the limit is {}",
                    Self::MAX_POOL_CAPACITY
                )));
            }
        }
        if self.max_passes_per_frame == 0 || self.max_passes_per_frame > Self::MAX_POOL_CAPACITY {
            return Err(GraphicsError::InvalidParameter(format!(
                "max_passes_per_frame must be in 1..={}, got {}",
                Self::MAX_POOL_CAPACITY,
                self.max_passes_per_frame
            )));
        }
        if self.max_queues == 0 {
            return Err(GraphicsError::InvalidParameter(
                "max_queues cannot be zero".to_string(),
            ));
        }
        if self.streaming_uniform_size == 0 || self.dynamic_uniform_size == 0 {
            return Err(GraphicsError::InvalidParameter(
                "uniform arena sizes cannot be zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SetupDescriptor::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_queues() {
        let desc = SetupDescriptor::default().with_max_queues(0);
        assert!(matches!(
            desc.validate(),
            Err(GraphicsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rejects_oversized_pool() {
        let desc = SetupDescriptor::default().with_max_buffers(1 << 20);
        assert!(desc.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_arena() {
        let desc = SetupDescriptor::default().with_uniform_sizes(0, 1024);
        assert!(desc.validate().is_err());
    }
}
