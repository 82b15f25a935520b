//! Common types and descriptors for graphics resources.
//!
//! This module contains format enums, usage flags, and descriptor structs
//! used throughout the graphics system. Resource descriptors offer
//! `with_defaults()`, which the context applies before creating a resource.

mod buffer;
mod common;
mod pass;
mod pipeline;
mod res_group;
mod sampler;
mod shader;
mod texture;

pub use buffer::{BufferDescriptor, BufferUsage};
pub use common::Rect;
pub use pass::{ComputePassDescriptor, RenderPassDescriptor};
pub use pipeline::{IndexFormat, PrimitiveTopology, RenderPipelineDescriptor};
pub use res_group::{ResGroupDescriptor, ResGroupLayoutDescriptor, ResGroupUsage};
pub use sampler::{AddressMode, FilterMode, SamplerDescriptor};
pub use shader::ShaderDescriptor;
pub use texture::{TextureDescriptor, TextureFormat, TextureUsage};
