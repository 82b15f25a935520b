//! Pass descriptors.

use crate::handles::{BufferHandle, ResGroupHandle, TextureHandle};

/// Descriptor for declaring a render pass.
///
/// Every target must have the same size; the pass extent is taken from them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RenderPassDescriptor {
    /// Debug label for the pass.
    pub label: Option<String>,
    /// Color targets, in attachment order.
    pub color_targets: Vec<TextureHandle>,
    /// Depth/stencil target.
    pub depth_stencil: Option<TextureHandle>,
    /// Queue override. `None` runs the pass on the graphics queue.
    pub queue: Option<usize>,
}

impl RenderPassDescriptor {
    /// Create a render pass descriptor.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    /// Append a color target.
    pub fn with_color_target(mut self, texture: TextureHandle) -> Self {
        self.color_targets.push(texture);
        self
    }

    /// Set the depth/stencil target.
    pub fn with_depth_stencil(mut self, texture: TextureHandle) -> Self {
        self.depth_stencil = Some(texture);
        self
    }

    /// Run the pass on `queue`.
    pub fn on_queue(mut self, queue: usize) -> Self {
        self.queue = Some(queue);
        self
    }
}

/// Descriptor for declaring a compute pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ComputePassDescriptor {
    /// Debug label for the pass.
    pub label: Option<String>,
    /// Storage textures written by the dispatch.
    pub storage_textures: Vec<TextureHandle>,
    /// Storage buffers written by the dispatch.
    pub storage_buffers: Vec<BufferHandle>,
    /// Resource groups read by the dispatch.
    pub res_groups: Vec<ResGroupHandle>,
    /// Workgroup counts.
    pub dispatch: [u32; 3],
    /// Queue override. `None` picks the async compute queue when the
    /// context has more than one queue.
    pub queue: Option<usize>,
}

impl ComputePassDescriptor {
    /// Create a compute pass descriptor dispatching `dispatch` workgroups.
    pub fn new(label: impl Into<String>, dispatch: [u32; 3]) -> Self {
        Self {
            label: Some(label.into()),
            dispatch,
            ..Default::default()
        }
    }

    /// Append a storage texture.
    pub fn with_storage_texture(mut self, texture: TextureHandle) -> Self {
        self.storage_textures.push(texture);
        self
    }

    /// Append a storage buffer.
    pub fn with_storage_buffer(mut self, buffer: BufferHandle) -> Self {
        self.storage_buffers.push(buffer);
        self
    }

    /// Read a resource group.
    pub fn with_res_group(mut self, group: ResGroupHandle) -> Self {
        self.res_groups.push(group);
        self
    }

    /// Run the pass on `queue`.
    pub fn on_queue(mut self, queue: usize) -> Self {
        self.queue = Some(queue);
        self
    }
}
