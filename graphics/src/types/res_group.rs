//! Resource group descriptors.
//!
//! A resource group is a bound set of GPU resources (a uniform range,
//! textures and samplers), the equivalent of a descriptor set or bind group.

use crate::handles::{ResGroupLayoutHandle, SamplerHandle, TextureHandle};

/// How long uniform data written to a resource group stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResGroupUsage {
    /// Data persists until the dynamic uniform arena is explicitly reset.
    #[default]
    Dynamic,
    /// Data lives for a single frame and must be rewritten every frame.
    Streaming,
}

/// Descriptor for creating a resource group layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ResGroupLayoutDescriptor {
    /// Debug label for the layout.
    pub label: Option<String>,
    /// Size of the uniform block in bytes, `0` if the group has none.
    pub uniform_size: u32,
    /// Number of texture bindings.
    pub texture_count: u8,
    /// Number of sampler bindings.
    pub sampler_count: u8,
}

impl ResGroupLayoutDescriptor {
    /// Create a layout descriptor.
    pub fn new(uniform_size: u32, texture_count: u8, sampler_count: u8) -> Self {
        Self {
            label: None,
            uniform_size,
            texture_count,
            sampler_count,
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Descriptor for creating a resource group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ResGroupDescriptor {
    /// Debug label for the group.
    pub label: Option<String>,
    /// Layout the group conforms to.
    pub layout: ResGroupLayoutHandle,
    /// Uniform data lifetime.
    pub usage: ResGroupUsage,
    /// Bound textures, in binding order.
    pub textures: Vec<TextureHandle>,
    /// Bound samplers, in binding order.
    pub samplers: Vec<SamplerHandle>,
}

impl ResGroupDescriptor {
    /// Create a group descriptor for `layout`.
    pub fn new(layout: ResGroupLayoutHandle, usage: ResGroupUsage) -> Self {
        Self {
            layout,
            usage,
            ..Default::default()
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Bind a texture to the next texture slot.
    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.textures.push(texture);
        self
    }

    /// Bind a sampler to the next sampler slot.
    pub fn with_sampler(mut self, sampler: SamplerHandle) -> Self {
        self.samplers.push(sampler);
        self
    }
}
