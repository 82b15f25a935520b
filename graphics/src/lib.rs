//! # Lattice Graphics
//!
//! Frame graph scheduler and resource runtime for a multi-queue GPU renderer.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`GraphicsContext`] - resource pools, uniform arenas and per-frame pass declaration
//! - [`graph`] - the frame graph compiler: dependency levels, queue lists and sync culling
//! - [`draw`] - delta-encoded draw command lists
//! - [`backend`] - the [`GpuBackend`](backend::GpuBackend) trait and a dummy backend for tests
//!
//! ## Example
//!
//! ```
//! use lattice_graphics::{GraphicsContext, SetupDescriptor};
//! use lattice_graphics::types::{RenderPassDescriptor, TextureDescriptor, TextureFormat};
//!
//! let mut ctx = GraphicsContext::setup(SetupDescriptor::default()).unwrap();
//! let target = ctx.make_texture(&TextureDescriptor::render_target(
//!     256,
//!     256,
//!     TextureFormat::Rgba8Unorm,
//! ));
//!
//! ctx.begin_render_pass(&RenderPassDescriptor::new("main").with_color_target(target));
//! let stats = ctx.commit();
//! assert_eq!(stats.pass_count, 1);
//! assert_eq!(ctx.frame_index(), 1);
//! ```

pub mod backend;
pub mod config;
pub mod context;
pub mod draw;
pub mod error;
pub mod executor;
pub mod graph;
pub mod handles;
pub mod resources;
pub mod types;

// Re-export main types for convenience
pub use backend::{BackendType, DummyBackend, GpuBackend};
pub use config::SetupDescriptor;
pub use context::GraphicsContext;
pub use draw::{DrawArea, DrawCommandList, DrawListBuilder, DrawRange};
pub use error::GraphicsError;
pub use executor::{FrameStats, PassSubmission};
pub use graph::{ExecutionPlan, FrameGraph, GraphError, PassKind};
pub use handles::{
    BufferHandle, PassHandle, PipelineHandle, ResGroupHandle, ResGroupLayoutHandle,
    SamplerHandle, ShaderHandle, TextureHandle,
};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_dummy_backend() {
        let backend = DummyBackend::new();
        assert_eq!(backend.name(), "Dummy");
    }
}
