//! Typed handles for every resource kind the context manages.
//!
//! All handles share the packed `{index, generation}` layout of
//! [`SlotId`](lattice_core::SlotId); the null handle of every kind is
//! `INVALID` (raw value `0`).

use lattice_core::define_handle;

define_handle!(
    /// Handle to a GPU buffer.
    pub struct BufferHandle, "buffer"
);

define_handle!(
    /// Handle to a GPU texture.
    pub struct TextureHandle, "texture"
);

define_handle!(
    /// Handle to a texture sampler.
    pub struct SamplerHandle, "sampler"
);

define_handle!(
    /// Handle to a render shader.
    pub struct ShaderHandle, "shader"
);

define_handle!(
    /// Handle to a render pipeline.
    pub struct PipelineHandle, "pipeline"
);

define_handle!(
    /// Handle to a resource group layout.
    pub struct ResGroupLayoutHandle, "resource group layout"
);

define_handle!(
    /// Handle to a resource group.
    pub struct ResGroupHandle, "resource group"
);

define_handle!(
    /// Handle to a pass declared in the current frame.
    ///
    /// The index is the pass's position in the frame graph; the generation
    /// is the frame tag, so a handle kept across `commit` is rejected.
    pub struct PassHandle, "pass"
);

static_assertions::assert_eq_size!(BufferHandle, u32);
static_assertions::assert_eq_size!(PassHandle, u32);
static_assertions::assert_impl_all!(PassHandle: Send, Sync, Copy);
