//! Delta-encoded draw command lists.
//!
//! A draw list is a flat `u32` stream. Each draw is encoded as one mask word
//! naming the state fields that changed since the previous draw, followed by
//! the new values of those fields in [`DrawField`] order, followed by four
//! range words:
//!
//! ```text
//! [mask] [field value]* [index offset] [index count] [vertex offset] [vertex count]
//! ```
//!
//! Handles are stored as their packed `u32` form. The decoder starts from the
//! same [`BoundState::INITIAL`] as the encoder and reapplies every delta, so
//! it reproduces the exact bound state of each draw.

mod decoder;
mod encoder;

pub use decoder::{DecodedDraw, DrawCommandIter};
pub use encoder::DrawListBuilder;

use bitflags::bitflags;

use crate::handles::{BufferHandle, PipelineHandle, ResGroupHandle};
use crate::types::Rect;

/// Number of vertex buffer slots.
pub const MAX_VERTEX_BUFFERS: usize = 3;
/// Resource group slots `1..=3` are bound per draw.
pub const MAX_RES_GROUPS: usize = 3;
/// Dynamic resource group slots `0..=1` carry a uniform offset.
pub const MAX_DYNAMIC_RES_GROUPS: usize = 2;
/// Words following every draw's field values.
pub const RANGE_WORDS: usize = 4;

bitflags! {
    /// Mask of state fields changed by a draw.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DrawFields: u32 {
        const PIPELINE = 1 << 0;
        const VERTEX_BUFFER_0 = 1 << 1;
        const VERTEX_BUFFER_1 = 1 << 2;
        const VERTEX_BUFFER_2 = 1 << 3;
        const INDEX_BUFFER = 1 << 4;
        const RES_GROUP_1 = 1 << 5;
        const RES_GROUP_2 = 1 << 6;
        const RES_GROUP_3 = 1 << 7;
        const DYNAMIC_RES_GROUP_0 = 1 << 8;
        const DYNAMIC_RES_GROUP_1 = 1 << 9;
        const INSTANCE_OFFSET = 1 << 10;
        const INSTANCE_COUNT = 1 << 11;
    }
}

/// A single encodable state field. Declaration order is wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawField {
    Pipeline,
    VertexBuffer0,
    VertexBuffer1,
    VertexBuffer2,
    IndexBuffer,
    ResGroup1,
    ResGroup2,
    ResGroup3,
    DynamicResGroup0,
    DynamicResGroup1,
    InstanceOffset,
    InstanceCount,
}

impl DrawField {
    /// Every field in wire order.
    pub const ALL: [DrawField; 12] = [
        Self::Pipeline,
        Self::VertexBuffer0,
        Self::VertexBuffer1,
        Self::VertexBuffer2,
        Self::IndexBuffer,
        Self::ResGroup1,
        Self::ResGroup2,
        Self::ResGroup3,
        Self::DynamicResGroup0,
        Self::DynamicResGroup1,
        Self::InstanceOffset,
        Self::InstanceCount,
    ];

    /// The mask bit of this field.
    pub const fn flag(self) -> DrawFields {
        DrawFields::from_bits_retain(1 << self as u32)
    }
}

/// Range words of a single draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DrawRange {
    /// First index (indexed draws).
    pub index_offset: u32,
    /// Index count, `0` for non-indexed draws.
    pub index_count: u32,
    /// First vertex, or base vertex for indexed draws.
    pub vertex_offset: u32,
    /// Vertex count (non-indexed draws).
    pub vertex_count: u32,
}

impl DrawRange {
    /// Non-indexed draw of `count` vertices.
    pub fn vertices(offset: u32, count: u32) -> Self {
        Self {
            vertex_offset: offset,
            vertex_count: count,
            ..Default::default()
        }
    }

    /// Indexed draw of `count` indices.
    pub fn indexed(offset: u32, count: u32, base_vertex: u32) -> Self {
        Self {
            index_offset: offset,
            index_count: count,
            vertex_offset: base_vertex,
            vertex_count: 0,
        }
    }

    /// Returns true if this draw reads the index buffer.
    pub fn is_indexed(&self) -> bool {
        self.index_count > 0
    }

    fn words(&self) -> [u32; RANGE_WORDS] {
        [
            self.index_offset,
            self.index_count,
            self.vertex_offset,
            self.vertex_count,
        ]
    }

    fn from_words(words: &[u32]) -> Self {
        Self {
            index_offset: words[0],
            index_count: words[1],
            vertex_offset: words[2],
            vertex_count: words[3],
        }
    }
}

/// Pipeline state bound for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundState {
    pub pipeline: PipelineHandle,
    pub vertex_buffers: [BufferHandle; MAX_VERTEX_BUFFERS],
    pub index_buffer: BufferHandle,
    /// Groups bound to slots 1, 2 and 3.
    pub res_groups: [ResGroupHandle; MAX_RES_GROUPS],
    /// Groups bound to dynamic slots 0 and 1.
    pub dynamic_res_groups: [ResGroupHandle; MAX_DYNAMIC_RES_GROUPS],
    pub instance_offset: u32,
    pub instance_count: u32,
}

impl BoundState {
    /// State before the first draw of every list: nothing bound, one instance.
    pub const INITIAL: Self = Self {
        pipeline: PipelineHandle::INVALID,
        vertex_buffers: [BufferHandle::INVALID; MAX_VERTEX_BUFFERS],
        index_buffer: BufferHandle::INVALID,
        res_groups: [ResGroupHandle::INVALID; MAX_RES_GROUPS],
        dynamic_res_groups: [ResGroupHandle::INVALID; MAX_DYNAMIC_RES_GROUPS],
        instance_offset: 0,
        instance_count: 1,
    };

    /// Wire value of `field`.
    pub fn get(&self, field: DrawField) -> u32 {
        match field {
            DrawField::Pipeline => self.pipeline.raw(),
            DrawField::VertexBuffer0 => self.vertex_buffers[0].raw(),
            DrawField::VertexBuffer1 => self.vertex_buffers[1].raw(),
            DrawField::VertexBuffer2 => self.vertex_buffers[2].raw(),
            DrawField::IndexBuffer => self.index_buffer.raw(),
            DrawField::ResGroup1 => self.res_groups[0].raw(),
            DrawField::ResGroup2 => self.res_groups[1].raw(),
            DrawField::ResGroup3 => self.res_groups[2].raw(),
            DrawField::DynamicResGroup0 => self.dynamic_res_groups[0].raw(),
            DrawField::DynamicResGroup1 => self.dynamic_res_groups[1].raw(),
            DrawField::InstanceOffset => self.instance_offset,
            DrawField::InstanceCount => self.instance_count,
        }
    }

    /// Overwrite `field` from its wire value.
    pub fn set(&mut self, field: DrawField, value: u32) {
        match field {
            DrawField::Pipeline => self.pipeline = PipelineHandle::from_raw(value),
            DrawField::VertexBuffer0 => self.vertex_buffers[0] = BufferHandle::from_raw(value),
            DrawField::VertexBuffer1 => self.vertex_buffers[1] = BufferHandle::from_raw(value),
            DrawField::VertexBuffer2 => self.vertex_buffers[2] = BufferHandle::from_raw(value),
            DrawField::IndexBuffer => self.index_buffer = BufferHandle::from_raw(value),
            DrawField::ResGroup1 => self.res_groups[0] = ResGroupHandle::from_raw(value),
            DrawField::ResGroup2 => self.res_groups[1] = ResGroupHandle::from_raw(value),
            DrawField::ResGroup3 => self.res_groups[2] = ResGroupHandle::from_raw(value),
            DrawField::DynamicResGroup0 => {
                self.dynamic_res_groups[0] = ResGroupHandle::from_raw(value)
            }
            DrawField::DynamicResGroup1 => {
                self.dynamic_res_groups[1] = ResGroupHandle::from_raw(value)
            }
            DrawField::InstanceOffset => self.instance_offset = value,
            DrawField::InstanceCount => self.instance_count = value,
        }
    }

    /// Fields whose value differs between `self` and `other`.
    pub fn diff(&self, other: &BoundState) -> DrawFields {
        DrawField::ALL
            .iter()
            .filter(|&&field| self.get(field) != other.get(field))
            .fold(DrawFields::empty(), |mask, field| mask | field.flag())
    }
}

impl Default for BoundState {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// A scissor rectangle together with the number of consecutive draws it
/// applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DrawArea {
    /// Scissor rectangle.
    pub rect: Rect,
    /// Number of draws from the list issued inside this area.
    pub draw_count: u32,
}

impl DrawArea {
    /// Create a draw area.
    pub fn new(rect: Rect, draw_count: u32) -> Self {
        Self { rect, draw_count }
    }
}

/// A finished, immutable draw command stream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DrawCommandList {
    words: Vec<u32>,
    draw_count: u32,
    res_groups: Vec<ResGroupHandle>,
    buffers: Vec<BufferHandle>,
}

impl DrawCommandList {
    /// Raw encoded words.
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Number of draws in the list.
    pub fn draw_count(&self) -> u32 {
        self.draw_count
    }

    /// Returns true if the list holds no draw.
    pub fn is_empty(&self) -> bool {
        self.draw_count == 0
    }

    /// Distinct resource groups bound by any draw, in first-use order.
    pub fn res_groups(&self) -> &[ResGroupHandle] {
        &self.res_groups
    }

    /// Distinct vertex and index buffers bound by any draw, in first-use
    /// order.
    pub fn buffers(&self) -> &[BufferHandle] {
        &self.buffers
    }

    /// Decode the draws.
    pub fn iter(&self) -> DrawCommandIter<'_> {
        DrawCommandIter::new(&self.words)
    }
}

impl<'a> IntoIterator for &'a DrawCommandList {
    type Item = DecodedDraw;
    type IntoIter = DrawCommandIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
