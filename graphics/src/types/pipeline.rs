//! Render pipeline descriptors.

use super::TextureFormat;
use crate::handles::{ResGroupLayoutHandle, ShaderHandle};

/// Index element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexFormat {
    /// 16-bit indices.
    #[default]
    Uint16,
    /// 32-bit indices.
    Uint32,
}

/// Primitive topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Independent triangles.
    #[default]
    TriangleList,
    /// Triangle strip.
    TriangleStrip,
    /// Independent lines.
    LineList,
    /// Points.
    PointList,
}

/// Descriptor for creating a render pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RenderPipelineDescriptor {
    /// Debug label for the pipeline.
    pub label: Option<String>,
    /// Shader providing both stages.
    pub shader: ShaderHandle,
    /// Resource group layouts, in group slot order.
    pub res_group_layouts: Vec<ResGroupLayoutHandle>,
    /// Number of vertex buffer slots used (at most 3).
    pub vertex_buffer_count: u8,
    /// Index format, or `None` for non-indexed drawing.
    pub index_format: Option<IndexFormat>,
    /// Primitive topology.
    pub topology: PrimitiveTopology,
    /// Color attachment formats. Empty means a single `Rgba8Unorm` target.
    pub color_formats: Vec<TextureFormat>,
    /// Depth attachment format.
    pub depth_format: Option<TextureFormat>,
}

impl RenderPipelineDescriptor {
    /// Create a pipeline descriptor for `shader`.
    pub fn new(shader: ShaderHandle) -> Self {
        Self {
            shader,
            vertex_buffer_count: 1,
            ..Default::default()
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Append a resource group layout.
    pub fn with_res_group_layout(mut self, layout: ResGroupLayoutHandle) -> Self {
        self.res_group_layouts.push(layout);
        self
    }

    /// Use indexed drawing.
    pub fn with_index_format(mut self, format: IndexFormat) -> Self {
        self.index_format = Some(format);
        self
    }

    /// Fill unset fields with their defaults.
    pub fn with_defaults(mut self) -> Self {
        if self.color_formats.is_empty() {
            self.color_formats.push(TextureFormat::Rgba8Unorm);
        }
        self
    }
}
