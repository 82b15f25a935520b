//! Sampler creation parameters.

/// Texel filter used when a lookup falls between texels or mip levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    #[default]
    Nearest,
    Linear,
}

/// Behaviour for coordinates outside the unit square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    #[default]
    ClampToEdge,
    Repeat,
    MirrorRepeat,
}

/// Parameters for [`GraphicsContext::make_sampler`](crate::GraphicsContext::make_sampler).
///
/// The zero value is a point-filtered, edge-clamped sampler.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SamplerDescriptor {
    pub label: Option<String>,
    pub address_mode_u: AddressMode,
    pub address_mode_v: AddressMode,
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
    pub mipmap_filter: FilterMode,
    /// Anisotropy limit. Zero is raised to one.
    pub anisotropy_clamp: u16,
}

impl SamplerDescriptor {
    /// Trilinear filtering on every axis.
    pub fn linear() -> Self {
        let filter = FilterMode::Linear;
        Self {
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: filter,
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Uses `mode` on both the U and V axes.
    pub fn with_address_mode(self, mode: AddressMode) -> Self {
        Self {
            address_mode_u: mode,
            address_mode_v: mode,
            ..self
        }
    }

    pub fn with_defaults(self) -> Self {
        Self {
            anisotropy_clamp: self.anisotropy_clamp.max(1),
            ..self
        }
    }
}
