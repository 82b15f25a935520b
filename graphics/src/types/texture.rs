//! Texture creation parameters.
//!
//! Only single-layer 2D images are modelled. Render passes attach them as
//! color or depth targets, and resource groups bind them for sampling or
//! storage access.

use bitflags::bitflags;

/// Pixel layout of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum TextureFormat {
    R8Unorm,
    R32Float,
    #[default]
    Rgba8Unorm,
    Rgba8UnormSrgb,
    /// Common swapchain layout.
    Bgra8Unorm,
    /// HDR color target.
    Rgba16Float,
    Rgba32Float,
    Depth32Float,
    Depth24PlusStencil8,
}

impl TextureFormat {
    /// Depth formats may only be attached as a render pass depth target.
    pub fn is_depth_stencil(&self) -> bool {
        matches!(self, Self::Depth32Float | Self::Depth24PlusStencil8)
    }

    /// Bytes per texel.
    pub fn block_size(&self) -> u32 {
        match self {
            Self::R8Unorm => 1,
            Self::Rgba16Float => 8,
            Self::Rgba32Float => 16,
            _ => 4,
        }
    }
}

bitflags! {
    /// Ways a texture may be attached or bound.
    ///
    /// The context checks these when a texture is placed into a resource
    /// group or a render pass, so a mismatch fails at declaration time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextureUsage: u32 {
        const COPY_SRC = 1 << 0;
        const COPY_DST = 1 << 1;
        /// Sampled through a resource group.
        const TEXTURE_BINDING = 1 << 2;
        /// Written by compute passes.
        const STORAGE_BINDING = 1 << 3;
        /// Color or depth target of a render pass.
        const RENDER_ATTACHMENT = 1 << 4;
    }
}

/// Parameters for [`GraphicsContext::make_texture`](crate::GraphicsContext::make_texture).
///
/// Zero counts and an empty usage set are placeholders that
/// [`with_defaults`](Self::with_defaults) resolves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TextureDescriptor {
    pub label: Option<String>,
    pub width: u32,
    pub height: u32,
    pub mip_level_count: u32,
    pub sample_count: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
}

impl TextureDescriptor {
    /// Single-sampled texture without a mip chain.
    pub fn new_2d(width: u32, height: u32, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            width,
            height,
            format,
            usage,
            mip_level_count: 1,
            sample_count: 1,
            label: None,
        }
    }

    /// Target written by one pass and sampled by later ones.
    pub fn render_target(width: u32, height: u32, format: TextureFormat) -> Self {
        let usage = TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING;
        Self::new_2d(width, height, format, usage)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_mip_levels(mut self, count: u32) -> Self {
        self.mip_level_count = count;
        self
    }

    /// Raises zero extents and counts to one. An empty usage set becomes
    /// [`TextureUsage::TEXTURE_BINDING`].
    pub fn with_defaults(self) -> Self {
        let usage = if self.usage.is_empty() {
            TextureUsage::TEXTURE_BINDING
        } else {
            self.usage
        };
        Self {
            width: self.width.max(1),
            height: self.height.max(1),
            mip_level_count: self.mip_level_count.max(1),
            sample_count: self.sample_count.max(1),
            usage,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_descriptor_resolves_to_one_texel() {
        let desc = TextureDescriptor::default().with_defaults();
        assert_eq!((desc.width, desc.height), (1, 1));
        assert_eq!((desc.mip_level_count, desc.sample_count), (1, 1));
        assert_eq!(desc.usage, TextureUsage::TEXTURE_BINDING);
        assert_eq!(desc.format, TextureFormat::Rgba8Unorm);
    }

    #[test]
    fn test_render_target_is_sampleable() {
        let desc = TextureDescriptor::render_target(640, 480, TextureFormat::Rgba16Float)
            .with_mip_levels(0)
            .with_defaults();
        let sampled_target = TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING;
        assert!(desc.usage.contains(sampled_target));
        assert_eq!(desc.mip_level_count, 1);
        assert_eq!(desc.format.block_size(), 8);
    }

    #[test]
    fn test_depth_formats() {
        assert!(TextureFormat::Depth32Float.is_depth_stencil());
        assert!(TextureFormat::Depth24PlusStencil8.is_depth_stencil());
        assert!(!TextureFormat::Bgra8Unorm.is_depth_stencil());
        assert_eq!(TextureFormat::R8Unorm.block_size(), 1);
    }
}
