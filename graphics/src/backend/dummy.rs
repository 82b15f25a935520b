//! Dummy GPU backend for testing and development.
//!
//! This backend doesn't perform actual GPU operations. It keeps a byte
//! mirror of every buffer and a log of submitted passes so tests can check
//! what the context asked for.

use std::any::Any;
use std::collections::HashMap;

use crate::error::GraphicsError;
use crate::executor::{PassSubmission, PassWait, PassWork};
use crate::graph::PassKind;
use crate::handles::PassHandle;
use crate::types::{
    BufferDescriptor, RenderPipelineDescriptor, SamplerDescriptor, ShaderDescriptor,
    TextureDescriptor,
};

use super::{GpuBackend, GpuBuffer, GpuPipeline, GpuSampler, GpuShader, GpuTexture};

/// What the dummy backend saw for one submitted pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedPass {
    /// Frame the pass belongs to.
    pub frame_index: u64,
    /// Pass handle.
    pub pass: PassHandle,
    /// Debug label.
    pub label: Option<String>,
    /// Pass kind.
    pub kind: PassKind,
    /// Queue the pass ran on.
    pub queue: usize,
    /// Global execution index.
    pub global_execution_index: usize,
    /// Dependency level.
    pub dependency_level: usize,
    /// Passes waited on before execution.
    pub waits: Vec<PassWait>,
    /// Whether the pass signalled on completion.
    pub signal: bool,
    /// Number of draws, zero for compute passes.
    pub draw_count: usize,
    /// Resolved dynamic uniform offsets of each draw.
    pub dynamic_offsets: Vec<[Option<u32>; 2]>,
}

/// Dummy GPU backend.
#[derive(Debug)]
pub struct DummyBackend {
    uniform_alignment: u32,
    next_id: u64,
    buffers: HashMap<u64, Vec<u8>>,
    live_resources: usize,
    current_frame: Option<u64>,
    frames_completed: u64,
    submissions: Vec<SubmittedPass>,
}

impl DummyBackend {
    /// Uniform offset alignment reported by default.
    pub const DEFAULT_UNIFORM_ALIGNMENT: u32 = 256;

    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self::with_uniform_alignment(Self::DEFAULT_UNIFORM_ALIGNMENT)
    }

    /// Create a dummy backend reporting a custom uniform offset alignment.
    pub fn with_uniform_alignment(alignment: u32) -> Self {
        assert!(
            alignment.is_power_of_two(),
            "uniform alignment must be a power of 2, got {alignment}"
        );
        Self {
            uniform_alignment: alignment,
            next_id: 1,
            buffers: HashMap::new(),
            live_resources: 0,
            current_frame: None,
            frames_completed: 0,
            submissions: Vec::new(),
        }
    }

    /// Passes submitted during the most recent frame.
    ///
    /// The log is cleared when the next frame begins.
    pub fn submissions(&self) -> &[SubmittedPass] {
        &self.submissions
    }

    /// Number of frames ended.
    pub fn frames_completed(&self) -> u64 {
        self.frames_completed
    }

    /// Number of resources created and not yet destroyed.
    pub fn live_resources(&self) -> usize {
        self.live_resources
    }

    /// Current contents of a dummy buffer.
    pub fn buffer_contents(&self, buffer: &GpuBuffer) -> Option<&[u8]> {
        match buffer {
            GpuBuffer::Dummy { id } => self.buffers.get(id).map(Vec::as_slice),
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.live_resources += 1;
        id
    }

    fn release(&mut self) {
        self.live_resources = self.live_resources.saturating_sub(1);
    }
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GpuBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy"
    }

    fn min_uniform_buffer_offset_alignment(&self) -> u32 {
        self.uniform_alignment
    }

    fn create_buffer(&mut self, descriptor: &BufferDescriptor) -> Result<GpuBuffer, GraphicsError> {
        log::trace!(
            "DummyBackend: creating buffer {:?} (size: {})",
            descriptor.label,
            descriptor.size
        );
        let size = usize::try_from(descriptor.size).map_err(|_| {
            GraphicsError::ResourceCreationFailed(format!(
                "buffer size {} does not fit in memory",
                descriptor.size
            ))
        })?;
        let id = self.allocate_id();
        self.buffers.insert(id, vec![0; size]);
        Ok(GpuBuffer::Dummy { id })
    }

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
    ) -> Result<GpuTexture, GraphicsError> {
        log::trace!(
            "DummyBackend: creating texture {:?} ({}x{}, {:?})",
            descriptor.label,
            descriptor.width,
            descriptor.height,
            descriptor.format
        );
        Ok(GpuTexture::Dummy {
            id: self.allocate_id(),
        })
    }

    fn create_sampler(
        &mut self,
        descriptor: &SamplerDescriptor,
    ) -> Result<GpuSampler, GraphicsError> {
        log::trace!("DummyBackend: creating sampler {:?}", descriptor.label);
        Ok(GpuSampler::Dummy {
            id: self.allocate_id(),
        })
    }

    fn create_shader(&mut self, descriptor: &ShaderDescriptor) -> Result<GpuShader, GraphicsError> {
        log::trace!("DummyBackend: compiling shader {:?}", descriptor.label);
        let label = || {
            descriptor
                .label
                .clone()
                .unwrap_or_else(|| "<unnamed>".to_string())
        };
        if descriptor.vertex_source.trim().is_empty() {
            return Err(GraphicsError::ShaderCompilation {
                label: label(),
                message: "empty vertex source".to_string(),
            });
        }
        if descriptor.fragment_source.trim().is_empty() {
            return Err(GraphicsError::ShaderCompilation {
                label: label(),
                message: "empty fragment source".to_string(),
            });
        }
        Ok(GpuShader::Dummy {
            id: self.allocate_id(),
        })
    }

    fn create_pipeline(
        &mut self,
        descriptor: &RenderPipelineDescriptor,
        _shader: &GpuShader,
    ) -> Result<GpuPipeline, GraphicsError> {
        log::trace!("DummyBackend: creating pipeline {:?}", descriptor.label);
        Ok(GpuPipeline::Dummy {
            id: self.allocate_id(),
        })
    }

    fn destroy_buffer(&mut self, buffer: GpuBuffer) {
        let GpuBuffer::Dummy { id } = buffer;
        log::trace!("DummyBackend: destroying buffer {id}");
        self.buffers.remove(&id);
        self.release();
    }

    fn destroy_texture(&mut self, texture: GpuTexture) {
        log::trace!("DummyBackend: destroying {texture:?}");
        self.release();
    }

    fn destroy_sampler(&mut self, sampler: GpuSampler) {
        log::trace!("DummyBackend: destroying {sampler:?}");
        self.release();
    }

    fn destroy_shader(&mut self, shader: GpuShader) {
        log::trace!("DummyBackend: destroying {shader:?}");
        self.release();
    }

    fn destroy_pipeline(&mut self, pipeline: GpuPipeline) {
        log::trace!("DummyBackend: destroying {pipeline:?}");
        self.release();
    }

    fn write_buffer(&mut self, buffer: &GpuBuffer, offset: u64, data: &[u8]) {
        log::trace!(
            "DummyBackend: write_buffer {:?} offset={} size={}",
            buffer,
            offset,
            data.len()
        );
        let GpuBuffer::Dummy { id } = buffer;
        let Some(contents) = self.buffers.get_mut(id) else {
            panic!("write to unknown dummy buffer {id}");
        };
        let start = offset as usize;
        let end = start + data.len();
        assert!(
            end <= contents.len(),
            "write of {} bytes at {offset} overflows dummy buffer {id} of {} bytes",
            data.len(),
            contents.len()
        );
        contents[start..end].copy_from_slice(data);
    }

    fn begin_frame(&mut self, frame_index: u64) {
        assert!(
            self.current_frame.is_none(),
            "begin_frame({frame_index}) while frame {:?} is open",
            self.current_frame
        );
        log::trace!("DummyBackend: begin frame {frame_index}");
        self.current_frame = Some(frame_index);
        self.submissions.clear();
    }

    fn submit_pass(&mut self, submission: &PassSubmission<'_>) -> Result<(), GraphicsError> {
        let Some(frame_index) = self.current_frame else {
            return Err(GraphicsError::Internal(format!(
                "pass {:?} submitted outside a frame",
                submission.pass
            )));
        };
        log::trace!(
            "DummyBackend: executing pass {} ({:?}) on queue {}, {} waits",
            submission.global_execution_index,
            submission.label,
            submission.queue,
            submission.waits.len()
        );
        let (draw_count, dynamic_offsets) = match &submission.work {
            PassWork::Render { draws, .. } => (
                draws.len(),
                draws.iter().map(|draw| draw.dynamic_offsets).collect(),
            ),
            PassWork::Compute { .. } => (0, Vec::new()),
        };
        self.submissions.push(SubmittedPass {
            frame_index,
            pass: submission.pass,
            label: submission.label.map(str::to_string),
            kind: submission.kind,
            queue: submission.queue,
            global_execution_index: submission.global_execution_index,
            dependency_level: submission.dependency_level,
            waits: submission.waits.clone(),
            signal: submission.signal,
            draw_count,
            dynamic_offsets,
        });
        Ok(())
    }

    fn end_frame(&mut self, frame_index: u64) {
        assert_eq!(
            self.current_frame.take(),
            Some(frame_index),
            "end_frame without matching begin_frame"
        );
        log::trace!("DummyBackend: end frame {frame_index}");
        self.frames_completed += 1;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
