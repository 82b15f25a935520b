//! The graphics context: resource pools, uniform arenas and the frame graph
//! behind one API.
//!
//! # Frame Flow
//!
//! ```text
//! begin_render_pass / begin_compute_pass   declare passes, tag written targets
//! set_draw_list                            attach draws, discover read edges
//! update_res_group                         push uniform data
//! commit                                   build, execute, advance the frame
//! ```
//!
//! Every texture or buffer written by a pass remembers that pass for the rest
//! of the frame. A later pass writing the same target gets a write edge, a
//! later pass binding it through a resource group or vertex/index slot gets a
//! read edge. Explicit edges can be added with
//! [`add_pass_dependency`](GraphicsContext::add_pass_dependency).
//!
//! # Errors
//!
//! Creation functions never fail loudly: on a backend or parameter error they
//! log it, store it as [`last_error`](GraphicsContext::last_error) and return
//! the null handle. Contract violations (stale handles, exhausted pools,
//! overflowing arenas, cyclic graphs) panic.

use lattice_core::{Handle, PassSet, PoolError};

use crate::backend::{GpuBackend, create_backend};
use crate::config::SetupDescriptor;
use crate::draw::{DrawArea, DrawCommandList, MAX_VERTEX_BUFFERS};
use crate::error::GraphicsError;
use crate::executor::{FrameExecutor, FrameStats};
use crate::graph::{
    ASYNC_COMPUTE_QUEUE, ExecutionPlan, FrameGraph, GRAPHICS_QUEUE, PassAttachments, PassKind,
    PassRecord,
};
use crate::handles::{
    BufferHandle, PassHandle, PipelineHandle, ResGroupHandle, ResGroupLayoutHandle,
    SamplerHandle, ShaderHandle, TextureHandle,
};
use crate::resources::{
    BufferRecord, BumpAllocator, PipelineRecord, ProducedBy, ResGroupLayoutRecord,
    ResGroupRecord, ResourceRegistry, SamplerRecord, ShaderRecord, TextureRecord, producer_in,
};
use crate::types::{
    BufferDescriptor, BufferUsage, ComputePassDescriptor, RenderPassDescriptor,
    RenderPipelineDescriptor, ResGroupDescriptor, ResGroupLayoutDescriptor, ResGroupUsage,
    SamplerDescriptor, ShaderDescriptor, TextureDescriptor, TextureUsage,
};

/// Owner of every GPU resource and of the per-frame graph.
pub struct GraphicsContext {
    desc: SetupDescriptor,
    backend: Box<dyn GpuBackend>,
    resources: ResourceRegistry,
    graph: FrameGraph,
    streaming: BumpAllocator,
    dynamic: BumpAllocator,
    frame_index: u64,
    last_error: Option<GraphicsError>,
    last_stats: FrameStats,
}

static_assertions::assert_impl_all!(GraphicsContext: Send);

impl GraphicsContext {
    /// Create a context with the backend named in `desc`.
    pub fn setup(desc: SetupDescriptor) -> Result<Self, GraphicsError> {
        desc.validate()?;
        let backend = create_backend(desc.backend)?;
        Self::with_backend(desc, backend)
    }

    /// Create a context driving an already constructed backend.
    pub fn with_backend(
        desc: SetupDescriptor,
        mut backend: Box<dyn GpuBackend>,
    ) -> Result<Self, GraphicsError> {
        desc.validate()?;
        let alignment = backend.min_uniform_buffer_offset_alignment();
        let streaming = create_arena(
            backend.as_mut(),
            ResGroupUsage::Streaming,
            desc.streaming_uniform_size,
            alignment,
        )?;
        let dynamic = create_arena(
            backend.as_mut(),
            ResGroupUsage::Dynamic,
            desc.dynamic_uniform_size,
            alignment,
        )?;

        log::info!(
            "Graphics context created: {} backend, {} queues, {} passes per frame",
            backend.name(),
            desc.max_queues,
            desc.max_passes_per_frame
        );

        Ok(Self {
            resources: ResourceRegistry::new(&desc),
            graph: FrameGraph::new(desc.max_passes_per_frame, desc.max_queues),
            desc,
            backend,
            streaming,
            dynamic,
            frame_index: 0,
            last_error: None,
            last_stats: FrameStats::default(),
        })
    }

    /// Release every live resource and return the backend.
    pub fn shutdown(mut self) -> Box<dyn GpuBackend> {
        let groups: Vec<_> = self.resources.res_groups.iter().map(|(h, _)| h).collect();
        groups.into_iter().for_each(|h| self.destroy_res_group(h));
        let layouts: Vec<_> = self.resources.res_group_layouts.iter().map(|(h, _)| h).collect();
        layouts.into_iter().for_each(|h| self.destroy_res_group_layout(h));
        let pipelines: Vec<_> = self.resources.pipelines.iter().map(|(h, _)| h).collect();
        pipelines.into_iter().for_each(|h| self.destroy_pipeline(h));
        let shaders: Vec<_> = self.resources.shaders.iter().map(|(h, _)| h).collect();
        shaders.into_iter().for_each(|h| self.destroy_shader(h));
        let samplers: Vec<_> = self.resources.samplers.iter().map(|(h, _)| h).collect();
        samplers.into_iter().for_each(|h| self.destroy_sampler(h));
        let textures: Vec<_> = self.resources.textures.iter().map(|(h, _)| h).collect();
        textures.into_iter().for_each(|h| self.destroy_texture(h));
        let buffers: Vec<_> = self.resources.buffers.iter().map(|(h, _)| h).collect();
        buffers.into_iter().for_each(|h| self.destroy_buffer(h));

        let Self {
            mut backend,
            streaming,
            dynamic,
            frame_index,
            ..
        } = self;
        streaming.destroy(backend.as_mut());
        dynamic.destroy(backend.as_mut());
        log::info!("Graphics context shut down after {frame_index} frames");
        backend
    }

    // ---- Errors ----

    /// Most recent recoverable error.
    pub fn last_error(&self) -> Option<&GraphicsError> {
        self.last_error.as_ref()
    }

    /// Take and clear the most recent recoverable error.
    pub fn take_last_error(&mut self) -> Option<GraphicsError> {
        self.last_error.take()
    }

    fn record_error(&mut self, error: GraphicsError) {
        log::error!("{error}");
        self.last_error = Some(error);
    }

    // ---- Resources ----

    /// Create a buffer. Returns the null handle on failure.
    pub fn make_buffer(&mut self, desc: &BufferDescriptor) -> BufferHandle {
        let desc = desc.clone().with_defaults();
        match self.backend.create_buffer(&desc) {
            Ok(gpu) => slot_or_panic(self.resources.buffers.alloc(BufferRecord {
                desc,
                gpu,
                produced_by: None,
            })),
            Err(err) => {
                self.record_error(err);
                BufferHandle::INVALID
            }
        }
    }

    /// Create a buffer and fill its beginning with `data`.
    pub fn make_buffer_with_data(&mut self, desc: &BufferDescriptor, data: &[u8]) -> BufferHandle {
        if data.len() as u64 > desc.size {
            self.record_error(GraphicsError::InvalidParameter(format!(
                "{} bytes of initial data exceed buffer size {}",
                data.len(),
                desc.size
            )));
            return BufferHandle::INVALID;
        }
        let handle = self.make_buffer(desc);
        if handle.is_valid() {
            self.update_buffer(handle, 0, data);
        }
        handle
    }

    /// Overwrite part of a buffer.
    ///
    /// Out-of-range writes are rejected and recorded as the last error.
    pub fn update_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) {
        let record = &self.resources.buffers[buffer];
        if offset + data.len() as u64 > record.desc.size {
            let err = GraphicsError::InvalidParameter(format!(
                "write of {} bytes at {offset} overflows buffer {buffer:?} of {} bytes",
                data.len(),
                record.desc.size
            ));
            self.record_error(err);
            return;
        }
        self.backend.write_buffer(&record.gpu, offset, data);
    }

    /// Create a texture. Returns the null handle on failure.
    pub fn make_texture(&mut self, desc: &TextureDescriptor) -> TextureHandle {
        let desc = desc.clone().with_defaults();
        match self.backend.create_texture(&desc) {
            Ok(gpu) => slot_or_panic(self.resources.textures.alloc(TextureRecord {
                desc,
                gpu,
                produced_by: None,
            })),
            Err(err) => {
                self.record_error(err);
                TextureHandle::INVALID
            }
        }
    }

    /// Create a sampler. Returns the null handle on failure.
    pub fn make_sampler(&mut self, desc: &SamplerDescriptor) -> SamplerHandle {
        let desc = desc.clone().with_defaults();
        match self.backend.create_sampler(&desc) {
            Ok(gpu) => slot_or_panic(self.resources.samplers.alloc(SamplerRecord { desc, gpu })),
            Err(err) => {
                self.record_error(err);
                SamplerHandle::INVALID
            }
        }
    }

    /// Compile a render shader. Returns the null handle if compilation fails.
    pub fn make_render_shader(&mut self, desc: &ShaderDescriptor) -> ShaderHandle {
        let desc = desc.clone().with_defaults();
        match self.backend.create_shader(&desc) {
            Ok(gpu) => slot_or_panic(self.resources.shaders.alloc(ShaderRecord { desc, gpu })),
            Err(err) => {
                self.record_error(err);
                ShaderHandle::INVALID
            }
        }
    }

    /// Create a resource group layout.
    pub fn make_res_group_layout(
        &mut self,
        desc: &ResGroupLayoutDescriptor,
    ) -> ResGroupLayoutHandle {
        slot_or_panic(
            self.resources
                .res_group_layouts
                .alloc(ResGroupLayoutRecord { desc: desc.clone() }),
        )
    }

    /// Create a resource group. Returns the null handle if the bindings do
    /// not match the layout.
    ///
    /// # Panics
    ///
    /// Panics if the layout or any bound texture or sampler is stale.
    pub fn make_res_group(&mut self, desc: &ResGroupDescriptor) -> ResGroupHandle {
        let layout = &self.resources.res_group_layouts[desc.layout].desc;
        if desc.textures.len() != usize::from(layout.texture_count)
            || desc.samplers.len() != usize::from(layout.sampler_count)
        {
            let err = GraphicsError::InvalidParameter(format!(
                "resource group {:?} binds {} textures and {} samplers, layout expects {} and {}",
                desc.label,
                desc.textures.len(),
                desc.samplers.len(),
                layout.texture_count,
                layout.sampler_count
            ));
            self.record_error(err);
            return ResGroupHandle::INVALID;
        }
        for &texture in &desc.textures {
            let usage = self.resources.textures[texture].desc.usage;
            assert!(
                usage.intersects(TextureUsage::TEXTURE_BINDING | TextureUsage::STORAGE_BINDING),
                "texture {texture:?} bound to a resource group cannot be sampled"
            );
        }
        for &sampler in &desc.samplers {
            assert!(
                self.resources.samplers.contains(sampler),
                "resource group binds stale sampler {sampler:?}"
            );
        }
        slot_or_panic(
            self.resources
                .res_groups
                .alloc(ResGroupRecord::new(desc.clone())),
        )
    }

    /// Create a render pipeline. Returns the null handle on failure.
    ///
    /// # Panics
    ///
    /// Panics if the shader or a layout is stale.
    pub fn make_render_pipeline(&mut self, desc: &RenderPipelineDescriptor) -> PipelineHandle {
        let desc = desc.clone().with_defaults();
        if usize::from(desc.vertex_buffer_count) > MAX_VERTEX_BUFFERS {
            self.record_error(GraphicsError::InvalidParameter(format!(
                "pipeline {:?} uses {} vertex buffers, at most {} are supported",
                desc.label,
                desc.vertex_buffer_count,
                MAX_VERTEX_BUFFERS
            )));
            return PipelineHandle::INVALID;
        }
        for &layout in &desc.res_group_layouts {
            assert!(
                self.resources.res_group_layouts.contains(layout),
                "pipeline uses stale resource group layout {layout:?}"
            );
        }
        let shader = &self.resources.shaders[desc.shader].gpu;
        match self.backend.create_pipeline(&desc, shader) {
            Ok(gpu) => slot_or_panic(self.resources.pipelines.alloc(PipelineRecord { desc, gpu })),
            Err(err) => {
                self.record_error(err);
                PipelineHandle::INVALID
            }
        }
    }

    /// Destroy a buffer.
    pub fn destroy_buffer(&mut self, buffer: BufferHandle) {
        let record = self.resources.buffers.free(buffer);
        if let Some(pass) = producer_in(record.produced_by, self.frame_index) {
            log::warn!("buffer {buffer:?} destroyed while pass {} still writes it", pass.index());
        }
        self.backend.destroy_buffer(record.gpu);
    }

    /// Destroy a texture.
    pub fn destroy_texture(&mut self, texture: TextureHandle) {
        let record = self.resources.textures.free(texture);
        if let Some(pass) = producer_in(record.produced_by, self.frame_index) {
            log::warn!(
                "texture {texture:?} destroyed while pass {} still writes it",
                pass.index()
            );
        }
        self.backend.destroy_texture(record.gpu);
    }

    /// Destroy a sampler.
    pub fn destroy_sampler(&mut self, sampler: SamplerHandle) {
        let record = self.resources.samplers.free(sampler);
        self.backend.destroy_sampler(record.gpu);
    }

    /// Destroy a shader.
    pub fn destroy_shader(&mut self, shader: ShaderHandle) {
        let record = self.resources.shaders.free(shader);
        self.backend.destroy_shader(record.gpu);
    }

    /// Destroy a render pipeline.
    pub fn destroy_pipeline(&mut self, pipeline: PipelineHandle) {
        let record = self.resources.pipelines.free(pipeline);
        self.backend.destroy_pipeline(record.gpu);
    }

    /// Destroy a resource group layout.
    pub fn destroy_res_group_layout(&mut self, layout: ResGroupLayoutHandle) {
        self.resources.res_group_layouts.free(layout);
    }

    /// Destroy a resource group.
    pub fn destroy_res_group(&mut self, group: ResGroupHandle) {
        self.resources.res_groups.free(group);
    }

    // ---- Uniforms ----

    /// Write the uniform block of `group` and return its offset.
    ///
    /// Streaming groups write into the per-frame arena and must be updated
    /// every frame they are drawn with; dynamic groups keep their data until
    /// [`reset_dynamic_uniforms`](Self::reset_dynamic_uniforms).
    ///
    /// # Panics
    ///
    /// Panics if `data` is larger than the layout's uniform block or the
    /// arena overflows.
    pub fn update_res_group(&mut self, group: ResGroupHandle, data: &[u8]) -> u32 {
        let record = &self.resources.res_groups[group];
        let uniform_size = self.resources.res_group_layouts[record.desc.layout]
            .desc
            .uniform_size;
        assert!(
            data.len() <= uniform_size as usize,
            "{} bytes exceed the {uniform_size}-byte uniform block of {group:?}",
            data.len()
        );
        let arena = match record.desc.usage {
            ResGroupUsage::Streaming => &mut self.streaming,
            ResGroupUsage::Dynamic => &mut self.dynamic,
        };
        let offset = arena.push_data(self.backend.as_mut(), data);

        let record = &mut self.resources.res_groups[group];
        record.uniform_offset = Some(offset);
        record.last_update_frame = Some(self.frame_index);
        offset
    }

    /// Write a plain-old-data value as the uniform block of `group`.
    pub fn update_res_group_value<T: bytemuck::Pod>(
        &mut self,
        group: ResGroupHandle,
        value: &T,
    ) -> u32 {
        self.update_res_group(group, bytemuck::bytes_of(value))
    }

    /// Rewind the dynamic uniform arena. Every dynamic group must be updated
    /// again before it is drawn with.
    pub fn reset_dynamic_uniforms(&mut self) {
        self.dynamic.reset();
        for (_, record) in self.resources.res_groups.iter_mut() {
            if record.desc.usage == ResGroupUsage::Dynamic {
                record.uniform_offset = None;
            }
        }
        log::debug!("dynamic uniform arena reset");
    }

    // ---- Passes ----

    /// Declare a render pass writing the descriptor's targets.
    ///
    /// # Panics
    ///
    /// Panics if the pass has no target, a target is stale or not a render
    /// attachment, or targets differ in size. Color and depth targets must
    /// carry matching formats, and the pass budget must not be exhausted.
    pub fn begin_render_pass(&mut self, desc: &RenderPassDescriptor) -> PassHandle {
        assert!(
            !desc.color_targets.is_empty() || desc.depth_stencil.is_some(),
            "render pass {:?} has no targets",
            desc.label
        );
        let frame = self.frame_index;
        let targets: Vec<_> = desc
            .color_targets
            .iter()
            .chain(desc.depth_stencil.as_ref())
            .copied()
            .collect();

        let mut write_deps = PassSet::new();
        let mut extent = None;
        for &target in &targets {
            let record = &self.resources.textures[target];
            assert!(
                record.desc.usage.contains(TextureUsage::RENDER_ATTACHMENT),
                "texture {target:?} is not a render attachment"
            );
            let size = (record.desc.width, record.desc.height);
            match extent {
                None => extent = Some(size),
                Some(expected) => assert_eq!(
                    expected, size,
                    "render pass {:?} targets differ in size",
                    desc.label
                ),
            }
            if let Some(producer) = producer_in(record.produced_by, frame) {
                write_deps.insert(producer.index());
            }
        }
        let (width, height) = extent.unwrap_or_default();
        for &target in &desc.color_targets {
            assert!(
                !self.resources.textures[target].desc.format.is_depth_stencil(),
                "depth texture {target:?} used as a color target"
            );
        }
        if let Some(depth) = desc.depth_stencil {
            assert!(
                self.resources.textures[depth].desc.format.is_depth_stencil(),
                "texture {depth:?} has no depth format"
            );
        }

        let attachments = PassAttachments::Render {
            color_targets: desc.color_targets.clone(),
            depth_stencil: desc.depth_stencil,
            width,
            height,
        };
        let queue = desc.queue.unwrap_or(GRAPHICS_QUEUE);
        self.declare(
            desc.label.as_deref(),
            attachments,
            queue,
            write_deps,
            PassSet::new(),
            &targets,
            &[],
        )
    }

    /// Declare a compute pass writing the descriptor's storage resources.
    ///
    /// Compute passes go to the async compute queue when the context has
    /// more than one queue, unless the descriptor names a queue.
    pub fn begin_compute_pass(&mut self, desc: &ComputePassDescriptor) -> PassHandle {
        let frame = self.frame_index;
        let handle = self.graph.handle_of(self.graph.pass_count());

        let mut write_deps = PassSet::new();
        for &texture in &desc.storage_textures {
            let record = &self.resources.textures[texture];
            assert!(
                record.desc.usage.contains(TextureUsage::STORAGE_BINDING),
                "texture {texture:?} is not a storage texture"
            );
            if let Some(producer) = producer_in(record.produced_by, frame) {
                write_deps.insert(producer.index());
            }
        }
        for &buffer in &desc.storage_buffers {
            let record = &self.resources.buffers[buffer];
            assert!(
                record.desc.usage.contains(BufferUsage::STORAGE),
                "buffer {buffer:?} is not a storage buffer"
            );
            if let Some(producer) = producer_in(record.produced_by, frame) {
                write_deps.insert(producer.index());
            }
        }

        let mut read_deps = PassSet::new();
        for &group in &desc.res_groups {
            read_deps.union_with(&self.resources.res_group_producers(group, frame, handle));
        }

        let attachments = PassAttachments::Compute {
            storage_textures: desc.storage_textures.clone(),
            storage_buffers: desc.storage_buffers.clone(),
            res_groups: desc.res_groups.clone(),
            dispatch: desc.dispatch,
        };
        let queue = desc.queue.unwrap_or(if self.desc.max_queues > 1 {
            ASYNC_COMPUTE_QUEUE
        } else {
            GRAPHICS_QUEUE
        });
        self.declare(
            desc.label.as_deref(),
            attachments,
            queue,
            write_deps,
            read_deps,
            &desc.storage_textures,
            &desc.storage_buffers,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn declare(
        &mut self,
        label: Option<&str>,
        attachments: PassAttachments,
        queue: usize,
        write_deps: PassSet,
        read_deps: PassSet,
        textures: &[TextureHandle],
        buffers: &[BufferHandle],
    ) -> PassHandle {
        let mut record = PassRecord::new(label.unwrap_or_default(), attachments).with_queue(queue);
        record.write_deps_mut().union_with(&write_deps);
        record.read_deps_mut().union_with(&read_deps);
        let handle = self.graph.declare_pass(record);

        let produced = Some(ProducedBy {
            frame: self.frame_index,
            pass: handle,
        });
        for &texture in textures {
            self.resources.textures[texture].produced_by = produced;
        }
        for &buffer in buffers {
            self.resources.buffers[buffer].produced_by = produced;
        }

        log::trace!(
            "frame {}: declared pass {} {:?} on queue {queue}",
            self.frame_index,
            handle.index(),
            label
        );
        handle
    }

    /// Attach a draw list to a render pass. Passes that produced a texture
    /// bound through one of the list's resource groups, or a buffer bound as
    /// vertex or index data, become read dependencies of `pass`.
    ///
    /// # Panics
    ///
    /// Panics if `pass` is stale or not a render pass, already has a draw
    /// list, or the areas do not cover exactly the list's draws.
    pub fn set_draw_list(&mut self, pass: PassHandle, areas: &[DrawArea], list: DrawCommandList) {
        let frame = self.frame_index;
        let record = self.graph.pass(pass);
        assert_eq!(
            record.kind(),
            PassKind::Render,
            "draw lists can only be set on render passes"
        );
        assert!(
            record.draw_list().is_none(),
            "draw list already set for pass {pass:?}"
        );
        let covered: u64 = areas.iter().map(|area| u64::from(area.draw_count)).sum();
        assert_eq!(
            covered,
            u64::from(list.draw_count()),
            "draw areas cover {covered} draws but the list holds {}",
            list.draw_count()
        );

        let mut read_deps = PassSet::new();
        for &group in list.res_groups() {
            read_deps.union_with(&self.resources.res_group_producers(group, frame, pass));
        }
        for &buffer in list.buffers() {
            if let Some(producer) = producer_in(self.resources.buffers[buffer].produced_by, frame) {
                if producer != pass {
                    read_deps.insert(producer.index());
                }
            }
        }

        let record = self.graph.pass_mut(pass);
        record.read_deps_mut().union_with(&read_deps);
        record.set_draw_list(areas.to_vec(), list);
    }

    /// Make `dependent` run after `dependency`.
    pub fn add_pass_dependency(&mut self, dependent: PassHandle, dependency: PassHandle) {
        self.graph.add_dependency(dependent, dependency);
    }

    // ---- Frame ----

    /// Build and execute the frame, then start the next one.
    ///
    /// # Panics
    ///
    /// Panics if the declared passes form a cycle.
    pub fn commit(&mut self) -> FrameStats {
        let frame = self.frame_index;
        if let Err(err) = self.graph.build() {
            log::error!("frame {frame}: {err}");
            panic!("frame {frame}: {err}");
        }

        self.backend.begin_frame(frame);
        let result =
            FrameExecutor::new(&self.resources, frame).execute(&self.graph, self.backend.as_mut());
        self.backend.end_frame(frame);
        self.graph.mark_executed();

        let mut stats = match result {
            Ok(stats) => stats,
            Err(err) => {
                self.record_error(err);
                FrameStats {
                    frame_index: frame,
                    ..Default::default()
                }
            }
        };
        stats.streaming_bytes = self.streaming.used();
        stats.dynamic_bytes = self.dynamic.used();
        log::debug!(
            "frame {frame} committed: {} passes, {} levels, {} draws, {} waits",
            stats.pass_count,
            stats.level_count,
            stats.draw_count,
            stats.sync_count
        );

        self.frame_index += 1;
        self.graph.reset();
        self.streaming.reset();
        self.last_stats = stats;
        stats
    }

    // ---- Accessors ----

    /// Index of the frame being recorded.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Plan of the last committed frame.
    pub fn plan(&self) -> &ExecutionPlan {
        self.graph.plan()
    }

    /// The frame graph of the frame being recorded.
    pub fn graph(&self) -> &FrameGraph {
        &self.graph
    }

    /// Resource pools.
    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// The backend.
    pub fn backend(&self) -> &dyn GpuBackend {
        self.backend.as_ref()
    }

    /// Setup parameters.
    pub fn setup_descriptor(&self) -> &SetupDescriptor {
        &self.desc
    }

    /// Per-frame uniform arena.
    pub fn streaming_uniforms(&self) -> &BumpAllocator {
        &self.streaming
    }

    /// Persistent uniform arena.
    pub fn dynamic_uniforms(&self) -> &BumpAllocator {
        &self.dynamic
    }

    /// Statistics of the last committed frame.
    pub fn last_stats(&self) -> &FrameStats {
        &self.last_stats
    }
}

impl std::fmt::Debug for GraphicsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsContext")
            .field("backend", &self.backend.name())
            .field("frame_index", &self.frame_index)
            .field("passes", &self.graph.pass_count())
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

fn create_arena(
    backend: &mut dyn GpuBackend,
    usage: ResGroupUsage,
    size: u32,
    alignment: u32,
) -> Result<BumpAllocator, GraphicsError> {
    let label = match usage {
        ResGroupUsage::Streaming => "streaming_uniforms",
        ResGroupUsage::Dynamic => "dynamic_uniforms",
    };
    let buffer = backend.create_buffer(
        &BufferDescriptor::new(u64::from(size), BufferUsage::UNIFORM | BufferUsage::COPY_DST)
            .with_label(label),
    )?;
    BumpAllocator::new(usage, buffer, size, alignment)
}

/// Pool exhaustion means the setup capacities are too small for the
/// application, which no caller can recover from.
fn slot_or_panic<H: Handle>(result: Result<H, PoolError>) -> H {
    match result {
        Ok(handle) => handle,
        Err(err) => panic!("{err}"),
    }
}
