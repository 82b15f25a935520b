//! GPU backend abstraction layer.
//!
//! The context never talks to a GPU API directly. Resource creation, buffer
//! uploads and pass submission all go through the [`GpuBackend`] trait; each
//! backend returns its own variant of the payload enums ([`GpuBuffer`],
//! [`GpuTexture`], ...) which the context stores next to the resource record.
//!
//! # Available Backends
//!
//! - `Dummy` (default): records what it is asked to do without touching a GPU

pub mod dummy;

use std::any::Any;

use crate::error::GraphicsError;
use crate::executor::PassSubmission;
use crate::types::{
    BufferDescriptor, RenderPipelineDescriptor, SamplerDescriptor, ShaderDescriptor,
    TextureDescriptor,
};

pub use dummy::{DummyBackend, SubmittedPass};

/// Available backend implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackendType {
    /// No-op backend for tests and headless tools.
    #[default]
    Dummy,
}

/// Backend payload of a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GpuBuffer {
    /// Dummy backend buffer, identified by its mirror id.
    Dummy { id: u64 },
}

/// Backend payload of a texture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GpuTexture {
    /// Dummy backend (no GPU allocation).
    Dummy { id: u64 },
}

/// Backend payload of a sampler.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GpuSampler {
    /// Dummy backend (no GPU allocation).
    Dummy { id: u64 },
}

/// Backend payload of a shader.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GpuShader {
    /// Dummy backend (no GPU allocation).
    Dummy { id: u64 },
}

/// Backend payload of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GpuPipeline {
    /// Dummy backend (no GPU allocation).
    Dummy { id: u64 },
}

/// Operations the context needs from a GPU API.
///
/// Creation failures are returned as [`GraphicsError`] and turned into null
/// handles by the context. Submission happens strictly inside
/// `begin_frame`/`end_frame`, one [`PassSubmission`] per pass in global
/// execution order.
pub trait GpuBackend: Send + 'static {
    /// Human-readable backend name.
    fn name(&self) -> &'static str;

    /// Required alignment of uniform buffer offsets, a power of two.
    fn min_uniform_buffer_offset_alignment(&self) -> u32;

    /// Create a buffer.
    fn create_buffer(&mut self, descriptor: &BufferDescriptor) -> Result<GpuBuffer, GraphicsError>;

    /// Create a texture.
    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
    ) -> Result<GpuTexture, GraphicsError>;

    /// Create a sampler.
    fn create_sampler(
        &mut self,
        descriptor: &SamplerDescriptor,
    ) -> Result<GpuSampler, GraphicsError>;

    /// Compile a render shader.
    fn create_shader(&mut self, descriptor: &ShaderDescriptor) -> Result<GpuShader, GraphicsError>;

    /// Create a render pipeline using an already compiled `shader`.
    fn create_pipeline(
        &mut self,
        descriptor: &RenderPipelineDescriptor,
        shader: &GpuShader,
    ) -> Result<GpuPipeline, GraphicsError>;

    /// Release a buffer.
    fn destroy_buffer(&mut self, buffer: GpuBuffer);

    /// Release a texture.
    fn destroy_texture(&mut self, texture: GpuTexture);

    /// Release a sampler.
    fn destroy_sampler(&mut self, sampler: GpuSampler);

    /// Release a shader.
    fn destroy_shader(&mut self, shader: GpuShader);

    /// Release a pipeline.
    fn destroy_pipeline(&mut self, pipeline: GpuPipeline);

    /// Copy `data` into `buffer` at byte `offset`.
    fn write_buffer(&mut self, buffer: &GpuBuffer, offset: u64, data: &[u8]);

    /// Start recording frame `frame_index`.
    fn begin_frame(&mut self, frame_index: u64);

    /// Encode and submit a single pass.
    fn submit_pass(&mut self, submission: &PassSubmission<'_>) -> Result<(), GraphicsError>;

    /// Finish frame `frame_index`.
    fn end_frame(&mut self, frame_index: u64);

    /// Downcast support, mainly for tests inspecting a concrete backend.
    fn as_any(&self) -> &dyn Any;
}

/// Create the backend selected by `backend_type`.
pub fn create_backend(backend_type: BackendType) -> Result<Box<dyn GpuBackend>, GraphicsError> {
    match backend_type {
        BackendType::Dummy => Ok(Box::new(DummyBackend::new())),
    }
}
