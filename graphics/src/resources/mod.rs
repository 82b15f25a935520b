//! Resource records and the registry that owns them.
//!
//! Every resource kind lives in its own fixed-capacity
//! [`SlotPool`](lattice_core::SlotPool). A record stores the resolved
//! descriptor, the backend payload and whatever per-frame bookkeeping the
//! frame graph needs:
//!
//! - [`BufferRecord`] and [`TextureRecord`] remember which pass of which
//!   frame last wrote them ([`ProducedBy`]), so later passes reading them
//!   pick up a dependency edge automatically.
//! - [`ResGroupRecord`] remembers where its uniform block was last written
//!   and which passes it depended on in the current frame.

mod bump;

pub use bump::BumpAllocator;

use lattice_core::{PassSet, SlotPool};

use crate::backend::{GpuBuffer, GpuPipeline, GpuSampler, GpuShader, GpuTexture};
use crate::config::SetupDescriptor;
use crate::handles::{
    BufferHandle, PassHandle, PipelineHandle, ResGroupHandle, ResGroupLayoutHandle,
    SamplerHandle, ShaderHandle, TextureHandle,
};
use crate::types::{
    BufferDescriptor, RenderPipelineDescriptor, ResGroupDescriptor, ResGroupLayoutDescriptor,
    SamplerDescriptor, ShaderDescriptor, TextureDescriptor,
};

/// The pass that last wrote a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProducedBy {
    /// Frame index of the write.
    pub frame: u64,
    /// Writing pass.
    pub pass: PassHandle,
}

/// A live buffer.
#[derive(Debug)]
pub struct BufferRecord {
    pub desc: BufferDescriptor,
    pub gpu: GpuBuffer,
    pub produced_by: Option<ProducedBy>,
}

/// A live texture.
#[derive(Debug)]
pub struct TextureRecord {
    pub desc: TextureDescriptor,
    pub gpu: GpuTexture,
    pub produced_by: Option<ProducedBy>,
}

/// A live sampler.
#[derive(Debug)]
pub struct SamplerRecord {
    pub desc: SamplerDescriptor,
    pub gpu: GpuSampler,
}

/// A live shader.
#[derive(Debug)]
pub struct ShaderRecord {
    pub desc: ShaderDescriptor,
    pub gpu: GpuShader,
}

/// A live render pipeline.
#[derive(Debug)]
pub struct PipelineRecord {
    pub desc: RenderPipelineDescriptor,
    pub gpu: GpuPipeline,
}

/// A live resource group layout.
#[derive(Debug)]
pub struct ResGroupLayoutRecord {
    pub desc: ResGroupLayoutDescriptor,
}

/// A live resource group.
#[derive(Debug)]
pub struct ResGroupRecord {
    pub desc: ResGroupDescriptor,
    /// Offset of the last uniform write into the group's arena.
    pub uniform_offset: Option<u32>,
    /// Frame of the last uniform write.
    pub last_update_frame: Option<u64>,
    /// Passes of `pass_dep_frame` that produced something this group binds.
    pub pass_dep_flags: PassSet,
    pub pass_dep_frame: u64,
}

impl ResGroupRecord {
    pub(crate) fn new(desc: ResGroupDescriptor) -> Self {
        Self {
            desc,
            uniform_offset: None,
            last_update_frame: None,
            pass_dep_flags: PassSet::new(),
            pass_dep_frame: 0,
        }
    }
}

/// Producer of a resource in `frame`, ignoring writes from earlier frames.
pub(crate) fn producer_in(produced_by: Option<ProducedBy>, frame: u64) -> Option<PassHandle> {
    produced_by
        .filter(|produced| produced.frame == frame)
        .map(|produced| produced.pass)
}

/// One slot pool per resource kind.
#[derive(Debug)]
pub struct ResourceRegistry {
    pub(crate) buffers: SlotPool<BufferHandle, BufferRecord>,
    pub(crate) textures: SlotPool<TextureHandle, TextureRecord>,
    pub(crate) samplers: SlotPool<SamplerHandle, SamplerRecord>,
    pub(crate) shaders: SlotPool<ShaderHandle, ShaderRecord>,
    pub(crate) pipelines: SlotPool<PipelineHandle, PipelineRecord>,
    pub(crate) res_group_layouts: SlotPool<ResGroupLayoutHandle, ResGroupLayoutRecord>,
    pub(crate) res_groups: SlotPool<ResGroupHandle, ResGroupRecord>,
}

impl ResourceRegistry {
    /// Create empty pools sized by `desc`.
    pub fn new(desc: &SetupDescriptor) -> Self {
        Self {
            buffers: SlotPool::new(desc.max_buffers),
            textures: SlotPool::new(desc.max_textures),
            samplers: SlotPool::new(desc.max_samplers),
            shaders: SlotPool::new(desc.max_shaders),
            pipelines: SlotPool::new(desc.max_pipelines),
            res_group_layouts: SlotPool::new(desc.max_res_group_layouts),
            res_groups: SlotPool::new(desc.max_res_groups),
        }
    }

    /// Buffer pool.
    pub fn buffers(&self) -> &SlotPool<BufferHandle, BufferRecord> {
        &self.buffers
    }

    /// Texture pool.
    pub fn textures(&self) -> &SlotPool<TextureHandle, TextureRecord> {
        &self.textures
    }

    /// Sampler pool.
    pub fn samplers(&self) -> &SlotPool<SamplerHandle, SamplerRecord> {
        &self.samplers
    }

    /// Shader pool.
    pub fn shaders(&self) -> &SlotPool<ShaderHandle, ShaderRecord> {
        &self.shaders
    }

    /// Pipeline pool.
    pub fn pipelines(&self) -> &SlotPool<PipelineHandle, PipelineRecord> {
        &self.pipelines
    }

    /// Resource group layout pool.
    pub fn res_group_layouts(&self) -> &SlotPool<ResGroupLayoutHandle, ResGroupLayoutRecord> {
        &self.res_group_layouts
    }

    /// Resource group pool.
    pub fn res_groups(&self) -> &SlotPool<ResGroupHandle, ResGroupRecord> {
        &self.res_groups
    }

    /// Passes of `frame` other than `reader` that wrote a resource bound by
    /// `group`. The result is also accumulated into the group's
    /// `pass_dep_flags`.
    ///
    /// # Panics
    ///
    /// Panics if `group` or any texture it binds is stale.
    pub(crate) fn res_group_producers(
        &mut self,
        group: ResGroupHandle,
        frame: u64,
        reader: PassHandle,
    ) -> PassSet {
        let mut producers = PassSet::new();
        for &texture in &self.res_groups[group].desc.textures {
            if let Some(pass) = producer_in(self.textures[texture].produced_by, frame) {
                if pass != reader {
                    producers.insert(pass.index());
                }
            }
        }

        let record = &mut self.res_groups[group];
        if record.pass_dep_frame != frame {
            record.pass_dep_flags.clear();
            record.pass_dep_frame = frame;
        }
        record.pass_dep_flags.union_with(&producers);
        producers
    }
}
