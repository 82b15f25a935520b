//! Draw list recording.

use super::{
    BoundState, DrawCommandList, DrawField, DrawFields, DrawRange, MAX_DYNAMIC_RES_GROUPS,
    MAX_RES_GROUPS, MAX_VERTEX_BUFFERS, RANGE_WORDS,
};
use crate::handles::{BufferHandle, PipelineHandle, ResGroupHandle};

/// Records draws into a [`DrawCommandList`], emitting only the state that
/// changed since the previous draw.
///
/// # Example
///
/// ```
/// use lattice_graphics::draw::{DrawListBuilder, DrawRange};
/// use lattice_graphics::PipelineHandle;
///
/// let pipeline = PipelineHandle::from_raw(0x0001_0000);
/// let mut builder = DrawListBuilder::new();
/// builder.set_pipeline(pipeline);
/// builder.draw(DrawRange::vertices(0, 3));
/// builder.draw(DrawRange::vertices(3, 3));
/// let list = builder.finish();
///
/// assert_eq!(list.draw_count(), 2);
/// // mask + pipeline + range, then mask + range
/// assert_eq!(list.words().len(), 6 + 5);
/// ```
#[derive(Debug, Clone)]
pub struct DrawListBuilder {
    words: Vec<u32>,
    emitted: BoundState,
    pending: BoundState,
    draw_count: u32,
    res_groups: Vec<ResGroupHandle>,
    buffers: Vec<BufferHandle>,
}

impl DrawListBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a builder with room for `words` encoded words.
    pub fn with_capacity(words: usize) -> Self {
        Self {
            words: Vec::with_capacity(words),
            emitted: BoundState::INITIAL,
            pending: BoundState::INITIAL,
            draw_count: 0,
            res_groups: Vec::new(),
            buffers: Vec::new(),
        }
    }

    /// Bind a pipeline.
    pub fn set_pipeline(&mut self, pipeline: PipelineHandle) -> &mut Self {
        self.pending.pipeline = pipeline;
        self
    }

    /// Bind a vertex buffer to `slot` (`0..3`).
    pub fn set_vertex_buffer(&mut self, slot: usize, buffer: BufferHandle) -> &mut Self {
        assert!(
            slot < MAX_VERTEX_BUFFERS,
            "vertex buffer slot {slot} out of range"
        );
        self.pending.vertex_buffers[slot] = buffer;
        self
    }

    /// Bind the index buffer.
    pub fn set_index_buffer(&mut self, buffer: BufferHandle) -> &mut Self {
        self.pending.index_buffer = buffer;
        self
    }

    /// Bind a resource group to `slot` (`1..=3`).
    pub fn set_res_group(&mut self, slot: usize, group: ResGroupHandle) -> &mut Self {
        assert!(
            (1..=MAX_RES_GROUPS).contains(&slot),
            "resource group slot {slot} out of range"
        );
        self.pending.res_groups[slot - 1] = group;
        self
    }

    /// Bind a dynamic resource group to `slot` (`0..2`).
    pub fn set_dynamic_res_group(&mut self, slot: usize, group: ResGroupHandle) -> &mut Self {
        assert!(
            slot < MAX_DYNAMIC_RES_GROUPS,
            "dynamic resource group slot {slot} out of range"
        );
        self.pending.dynamic_res_groups[slot] = group;
        self
    }

    /// Set the instance range of subsequent draws.
    pub fn set_instances(&mut self, offset: u32, count: u32) -> &mut Self {
        self.pending.instance_offset = offset;
        self.pending.instance_count = count;
        self
    }

    /// Record a draw with the currently bound state.
    pub fn draw(&mut self, range: DrawRange) -> &mut Self {
        let changed = self.pending.diff(&self.emitted);
        self.words.reserve(1 + changed.bits().count_ones() as usize + RANGE_WORDS);
        self.words.push(changed.bits());
        for field in DrawField::ALL {
            if changed.contains(field.flag()) {
                self.words.push(self.pending.get(field));
            }
        }
        self.words.extend_from_slice(&range.words());
        self.track_references(changed);
        self.emitted = self.pending;
        self.draw_count += 1;
        self
    }

    /// Record a non-indexed draw.
    pub fn draw_vertices(&mut self, offset: u32, count: u32) -> &mut Self {
        self.draw(DrawRange::vertices(offset, count))
    }

    /// Record an indexed draw.
    pub fn draw_indexed(&mut self, offset: u32, count: u32, base_vertex: u32) -> &mut Self {
        self.draw(DrawRange::indexed(offset, count, base_vertex))
    }

    /// Number of draws recorded so far.
    pub fn draw_count(&self) -> u32 {
        self.draw_count
    }

    /// Finish recording.
    pub fn finish(self) -> DrawCommandList {
        DrawCommandList {
            words: self.words,
            draw_count: self.draw_count,
            res_groups: self.res_groups,
            buffers: self.buffers,
        }
    }

    fn track_references(&mut self, changed: DrawFields) {
        let state = &self.pending;
        let groups = state.res_groups.iter().chain(&state.dynamic_res_groups);
        if changed.intersects(
            DrawFields::RES_GROUP_1
                | DrawFields::RES_GROUP_2
                | DrawFields::RES_GROUP_3
                | DrawFields::DYNAMIC_RES_GROUP_0
                | DrawFields::DYNAMIC_RES_GROUP_1,
        ) {
            for &group in groups {
                if group.is_valid() && !self.res_groups.contains(&group) {
                    self.res_groups.push(group);
                }
            }
        }
        if changed.intersects(
            DrawFields::VERTEX_BUFFER_0
                | DrawFields::VERTEX_BUFFER_1
                | DrawFields::VERTEX_BUFFER_2
                | DrawFields::INDEX_BUFFER,
        ) {
            for &buffer in state.vertex_buffers.iter().chain([&state.index_buffer]) {
                if buffer.is_valid() && !self.buffers.contains(&buffer) {
                    self.buffers.push(buffer);
                }
            }
        }
    }
}

impl Default for DrawListBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline(raw: u32) -> PipelineHandle {
        PipelineHandle::from_raw(raw)
    }

    #[test]
    fn test_first_draw_emits_changed_fields_only() {
        let mut builder = DrawListBuilder::new();
        builder
            .set_pipeline(pipeline(0x0001_0002))
            .set_vertex_buffer(0, BufferHandle::from_raw(0x0001_0000))
            .draw_vertices(0, 36);
        let list = builder.finish();

        let mask = (DrawFields::PIPELINE | DrawFields::VERTEX_BUFFER_0).bits();
        assert_eq!(
            list.words(),
            &[mask, 0x0001_0002, 0x0001_0000, 0, 0, 0, 36]
        );
    }

    #[test]
    fn test_unchanged_state_is_not_reemitted() {
        let mut builder = DrawListBuilder::new();
        builder.set_pipeline(pipeline(0x0001_0000)).draw_vertices(0, 3);
        builder.set_pipeline(pipeline(0x0001_0000)).draw_vertices(3, 3);
        let list = builder.finish();

        assert_eq!(&list.words()[6..], &[0, 0, 0, 3, 3]);
    }

    #[test]
    fn test_instance_count_default_is_one() {
        let mut builder = DrawListBuilder::new();
        builder.set_instances(0, 1).draw_vertices(0, 3);
        builder.set_instances(0, 4).draw_vertices(0, 3);
        let list = builder.finish();

        assert_eq!(list.words()[0], 0);
        assert_eq!(list.words()[5], DrawFields::INSTANCE_COUNT.bits());
        assert_eq!(list.words()[6], 4);
    }

    #[test]
    fn test_references_are_distinct() {
        let group_a = ResGroupHandle::from_raw(0x0001_0000);
        let group_b = ResGroupHandle::from_raw(0x0001_0001);
        let vb = BufferHandle::from_raw(0x0001_0004);
        let ib = BufferHandle::from_raw(0x0001_0005);

        let mut builder = DrawListBuilder::new();
        builder
            .set_res_group(1, group_a)
            .set_vertex_buffer(0, vb)
            .set_index_buffer(ib)
            .draw_indexed(0, 6, 0);
        builder.set_dynamic_res_group(0, group_b).draw_indexed(6, 6, 0);
        builder.set_res_group(1, group_a).draw_indexed(12, 6, 0);
        let list = builder.finish();

        assert_eq!(list.res_groups(), &[group_a, group_b]);
        assert_eq!(list.buffers(), &[vb, ib]);
        assert_eq!(list.draw_count(), 3);
    }

    #[test]
    #[should_panic(expected = "resource group slot 0 out of range")]
    fn test_res_group_slot_zero_rejected() {
        DrawListBuilder::new().set_res_group(0, ResGroupHandle::INVALID);
    }

    #[test]
    fn test_empty_list() {
        let list = DrawListBuilder::default().finish();
        assert!(list.is_empty());
        assert!(list.words().is_empty());
        assert_eq!(list.iter().count(), 0);
    }
}
