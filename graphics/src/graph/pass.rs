//! Pass records stored in the frame graph.

use lattice_core::PassSet;

use crate::draw::{DrawArea, DrawCommandList};
use crate::handles::{BufferHandle, PassHandle, ResGroupHandle, TextureHandle};

/// Queue render passes run on.
pub const GRAPHICS_QUEUE: usize = 0;
/// Queue compute passes run on when more than one queue is available.
pub const ASYNC_COMPUTE_QUEUE: usize = 1;

/// The kind of work a pass performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Rasterization into render targets.
    Render,
    /// Compute dispatch.
    Compute,
}

/// Resources a pass writes, plus kind-specific parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassAttachments {
    /// Render pass targets.
    Render {
        color_targets: Vec<TextureHandle>,
        depth_stencil: Option<TextureHandle>,
        width: u32,
        height: u32,
    },
    /// Compute pass bindings.
    Compute {
        storage_textures: Vec<TextureHandle>,
        storage_buffers: Vec<BufferHandle>,
        /// Groups read by the dispatch.
        res_groups: Vec<ResGroupHandle>,
        /// Workgroup counts.
        dispatch: [u32; 3],
    },
}

/// A pass declared in the current frame.
///
/// Dependencies are recorded as two sets of pass indices: `read_deps`, the
/// passes whose output this pass samples, and `write_deps`, the passes that
/// wrote a target this pass writes again. Both sets are edges of the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassRecord {
    label: Option<String>,
    queue: usize,
    read_deps: PassSet,
    write_deps: PassSet,
    attachments: PassAttachments,
    draw_areas: Vec<DrawArea>,
    draw_list: Option<DrawCommandList>,
}

impl PassRecord {
    /// Create a render pass record with no targets on [`GRAPHICS_QUEUE`].
    pub fn render(label: impl Into<String>) -> Self {
        Self::new(
            label,
            PassAttachments::Render {
                color_targets: Vec::new(),
                depth_stencil: None,
                width: 0,
                height: 0,
            },
        )
    }

    /// Create a compute pass record with an empty dispatch on
    /// [`GRAPHICS_QUEUE`].
    pub fn compute(label: impl Into<String>) -> Self {
        Self::new(
            label,
            PassAttachments::Compute {
                storage_textures: Vec::new(),
                storage_buffers: Vec::new(),
                res_groups: Vec::new(),
                dispatch: [0; 3],
            },
        )
    }

    /// Create a record with the given attachments.
    pub fn new(label: impl Into<String>, attachments: PassAttachments) -> Self {
        let label = label.into();
        Self {
            label: (!label.is_empty()).then_some(label),
            queue: GRAPHICS_QUEUE,
            read_deps: PassSet::new(),
            write_deps: PassSet::new(),
            attachments,
            draw_areas: Vec::new(),
            draw_list: None,
        }
    }

    /// Run the pass on `queue`.
    pub fn with_queue(mut self, queue: usize) -> Self {
        self.queue = queue;
        self
    }

    /// Add a read dependency on `pass`.
    pub fn reads(mut self, pass: PassHandle) -> Self {
        self.read_deps.insert(pass.index());
        self
    }

    /// Add a write-after-write dependency on `pass`.
    pub fn writes_after(mut self, pass: PassHandle) -> Self {
        self.write_deps.insert(pass.index());
        self
    }

    /// Debug label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Pass kind.
    pub fn kind(&self) -> PassKind {
        match self.attachments {
            PassAttachments::Render { .. } => PassKind::Render,
            PassAttachments::Compute { .. } => PassKind::Compute,
        }
    }

    /// Queue index.
    pub fn queue(&self) -> usize {
        self.queue
    }

    /// Passes this pass reads from.
    pub fn read_deps(&self) -> &PassSet {
        &self.read_deps
    }

    /// Passes whose targets this pass writes again.
    pub fn write_deps(&self) -> &PassSet {
        &self.write_deps
    }

    /// Union of read and write dependencies.
    pub fn dependencies(&self) -> PassSet {
        let mut deps = self.read_deps.clone();
        deps.union_with(&self.write_deps);
        deps
    }

    /// Targets and parameters.
    pub fn attachments(&self) -> &PassAttachments {
        &self.attachments
    }

    /// Scissor areas of the draw list.
    pub fn draw_areas(&self) -> &[DrawArea] {
        &self.draw_areas
    }

    /// Draw list, if one was set.
    pub fn draw_list(&self) -> Option<&DrawCommandList> {
        self.draw_list.as_ref()
    }

    pub(crate) fn read_deps_mut(&mut self) -> &mut PassSet {
        &mut self.read_deps
    }

    pub(crate) fn write_deps_mut(&mut self) -> &mut PassSet {
        &mut self.write_deps
    }

    pub(crate) fn set_draw_list(&mut self, areas: Vec<DrawArea>, list: DrawCommandList) {
        self.draw_areas = areas;
        self.draw_list = Some(list);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_core::{Handle, SlotId};

    #[test]
    fn test_kind_follows_attachments() {
        assert_eq!(PassRecord::render("gbuffer").kind(), PassKind::Render);
        assert_eq!(PassRecord::compute("cull").kind(), PassKind::Compute);
    }

    #[test]
    fn test_builder_dependencies() {
        let a = PassHandle::from_slot(SlotId::new(0, 1));
        let b = PassHandle::from_slot(SlotId::new(1, 1));
        let record = PassRecord::render("lighting")
            .with_queue(2)
            .reads(a)
            .writes_after(b);

        assert_eq!(record.queue(), 2);
        assert_eq!(record.label(), Some("lighting"));
        assert!(record.read_deps().contains(0));
        assert!(record.write_deps().contains(1));
        assert_eq!(record.dependencies().iter().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_empty_label_is_none() {
        assert_eq!(PassRecord::compute("").label(), None);
    }
}
