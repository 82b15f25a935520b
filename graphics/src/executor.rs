//! Frame execution.
//!
//! [`FrameExecutor`] walks a built [`ExecutionPlan`] level by level and, inside
//! each level, queue by queue. For every pass it resolves the waits chosen by
//! sync culling into `(pass, queue)` pairs, decodes the draw list into fully
//! bound draws with their dynamic uniform offsets, and hands the result to the
//! backend as a [`PassSubmission`].

use crate::backend::GpuBackend;
use crate::draw::{BoundState, DrawArea, DrawCommandList, DrawFields, DrawRange};
use crate::error::GraphicsError;
use crate::graph::{ExecutionPlan, FrameGraph, FrameGraphState, PassAttachments, PassKind};
use crate::handles::{BufferHandle, PassHandle, ResGroupHandle, TextureHandle};
use crate::resources::ResourceRegistry;
use crate::types::ResGroupUsage;

/// A wait on another pass's completion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassWait {
    /// Pass to wait on.
    pub pass: PassHandle,
    /// Queue that pass runs on.
    pub queue: usize,
}

/// A decoded draw with everything the backend needs to issue it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDraw {
    /// Index of the draw area (scissor) this draw belongs to.
    pub area: usize,
    /// Fields rebound by this draw.
    pub changed: DrawFields,
    /// Complete bound state.
    pub state: BoundState,
    /// Draw range.
    pub range: DrawRange,
    /// Uniform offsets of the two dynamic resource group slots.
    pub dynamic_offsets: [Option<u32>; 2],
}

/// Kind-specific work of a submitted pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassWork<'a> {
    /// Rasterization.
    Render {
        color_targets: &'a [TextureHandle],
        depth_stencil: Option<TextureHandle>,
        width: u32,
        height: u32,
        areas: &'a [DrawArea],
        draws: Vec<ResolvedDraw>,
    },
    /// Compute dispatch.
    Compute {
        storage_textures: &'a [TextureHandle],
        storage_buffers: &'a [BufferHandle],
        res_groups: &'a [ResGroupHandle],
        /// Uniform offset of each group in `res_groups`.
        uniform_offsets: Vec<Option<u32>>,
        dispatch: [u32; 3],
    },
}

/// Everything a backend needs to encode and submit one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassSubmission<'a> {
    pub frame_index: u64,
    pub pass: PassHandle,
    pub label: Option<&'a str>,
    pub kind: PassKind,
    pub queue: usize,
    pub dependency_level: usize,
    pub global_execution_index: usize,
    /// Passes on other queues to wait on before starting.
    pub waits: Vec<PassWait>,
    /// Whether a later pass waits on this one.
    pub signal: bool,
    pub work: PassWork<'a>,
}

/// Summary of a committed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FrameStats {
    pub frame_index: u64,
    pub pass_count: usize,
    pub level_count: usize,
    pub draw_count: usize,
    /// Cross-queue waits after culling.
    pub sync_count: usize,
    /// Streaming uniform bytes used by the frame.
    pub streaming_bytes: u32,
    /// Dynamic uniform bytes in use at commit.
    pub dynamic_bytes: u32,
}

/// Submits a built frame graph to a backend.
#[derive(Debug, Clone, Copy)]
pub struct FrameExecutor<'a> {
    resources: &'a ResourceRegistry,
    frame_index: u64,
}

impl<'a> FrameExecutor<'a> {
    /// Create an executor for `frame_index`.
    pub fn new(resources: &'a ResourceRegistry, frame_index: u64) -> Self {
        Self {
            resources,
            frame_index,
        }
    }

    /// Submit every pass of `graph` in global execution order.
    ///
    /// # Panics
    ///
    /// Panics if the graph is not built, or if a draw binds a stale resource
    /// or a resource group whose uniforms are missing.
    pub fn execute(
        &self,
        graph: &FrameGraph,
        backend: &mut dyn GpuBackend,
    ) -> Result<FrameStats, GraphicsError> {
        assert_eq!(
            graph.state(),
            FrameGraphState::Built,
            "frame graph must be built before execution"
        );
        let plan = graph.plan();
        let mut stats = FrameStats {
            frame_index: self.frame_index,
            pass_count: plan.pass_count(),
            level_count: plan.levels().len(),
            sync_count: plan.sync_count(),
            ..Default::default()
        };

        for level in plan.levels() {
            for queue_nodes in level.nodes_per_queue() {
                for &pass in queue_nodes {
                    let submission = self.prepare(graph, plan, pass);
                    if let PassWork::Render { draws, .. } = &submission.work {
                        stats.draw_count += draws.len();
                    }
                    backend.submit_pass(&submission)?;
                }
            }
        }
        Ok(stats)
    }

    fn prepare<'g>(
        &self,
        graph: &'g FrameGraph,
        plan: &ExecutionPlan,
        pass: usize,
    ) -> PassSubmission<'g> {
        let record = &graph.passes()[pass];
        let node = plan.node(pass);
        let waits = plan
            .sync_with(pass)
            .iter()
            .map(|dependency| PassWait {
                pass: graph.handle_of(dependency),
                queue: plan.node(dependency).queue,
            })
            .collect();

        let work = match record.attachments() {
            PassAttachments::Render {
                color_targets,
                depth_stencil,
                width,
                height,
            } => PassWork::Render {
                color_targets,
                depth_stencil: *depth_stencil,
                width: *width,
                height: *height,
                areas: record.draw_areas(),
                draws: record
                    .draw_list()
                    .map(|list| self.resolve_draws(record.draw_areas(), list))
                    .unwrap_or_default(),
            },
            PassAttachments::Compute {
                storage_textures,
                storage_buffers,
                res_groups,
                dispatch,
            } => PassWork::Compute {
                storage_textures,
                storage_buffers,
                res_groups,
                uniform_offsets: res_groups
                    .iter()
                    .map(|&group| self.uniform_offset(group))
                    .collect(),
                dispatch: *dispatch,
            },
        };

        PassSubmission {
            frame_index: self.frame_index,
            pass: graph.handle_of(pass),
            label: record.label(),
            kind: record.kind(),
            queue: node.queue,
            dependency_level: node.dependency_level,
            global_execution_index: node.global_execution_index,
            waits,
            signal: plan.signal_required(pass),
            work,
        }
    }

    fn resolve_draws(&self, areas: &[DrawArea], list: &DrawCommandList) -> Vec<ResolvedDraw> {
        let area_of_draw = areas
            .iter()
            .enumerate()
            .flat_map(|(index, area)| std::iter::repeat_n(index, area.draw_count as usize));

        list.iter()
            .zip(area_of_draw)
            .map(|(draw, area)| {
                self.check_bindings(&draw.state, draw.changed);
                let [slot0, slot1] = draw.state.dynamic_res_groups;
                ResolvedDraw {
                    area,
                    changed: draw.changed,
                    state: draw.state,
                    range: draw.range,
                    dynamic_offsets: [self.uniform_offset(slot0), self.uniform_offset(slot1)],
                }
            })
            .collect()
    }

    /// Stale handles only need checking when they are (re)bound.
    fn check_bindings(&self, state: &BoundState, changed: DrawFields) {
        if changed.contains(DrawFields::PIPELINE) && state.pipeline.is_valid() {
            assert!(
                self.resources.pipelines.contains(state.pipeline),
                "draw binds stale pipeline {:?}",
                state.pipeline
            );
        }
        let buffers = [
            (DrawFields::VERTEX_BUFFER_0, state.vertex_buffers[0]),
            (DrawFields::VERTEX_BUFFER_1, state.vertex_buffers[1]),
            (DrawFields::VERTEX_BUFFER_2, state.vertex_buffers[2]),
            (DrawFields::INDEX_BUFFER, state.index_buffer),
        ];
        for (flag, buffer) in buffers {
            if changed.contains(flag) && buffer.is_valid() {
                assert!(
                    self.resources.buffers.contains(buffer),
                    "draw binds stale buffer {buffer:?}"
                );
            }
        }
        let groups = [
            (DrawFields::RES_GROUP_1, state.res_groups[0]),
            (DrawFields::RES_GROUP_2, state.res_groups[1]),
            (DrawFields::RES_GROUP_3, state.res_groups[2]),
            (DrawFields::DYNAMIC_RES_GROUP_0, state.dynamic_res_groups[0]),
            (DrawFields::DYNAMIC_RES_GROUP_1, state.dynamic_res_groups[1]),
        ];
        for (flag, group) in groups {
            if changed.contains(flag) && group.is_valid() {
                assert!(
                    self.resources.res_groups.contains(group),
                    "draw binds stale resource group {group:?}"
                );
            }
        }
    }

    /// Uniform offset of `group`, or `None` if nothing is bound or the
    /// group's layout has no uniform block.
    fn uniform_offset(&self, group: ResGroupHandle) -> Option<u32> {
        if !group.is_valid() {
            return None;
        }
        let record = &self.resources.res_groups[group];
        let layout = &self.resources.res_group_layouts[record.desc.layout];
        if layout.desc.uniform_size == 0 {
            return None;
        }
        if record.desc.usage == ResGroupUsage::Streaming {
            assert_eq!(
                record.last_update_frame,
                Some(self.frame_index),
                "streaming resource group {group:?} bound without an update this frame"
            );
        }
        match record.uniform_offset {
            Some(offset) => Some(offset),
            None => panic!("resource group {group:?} bound before its uniforms were written"),
        }
    }
}
