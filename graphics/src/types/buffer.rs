//! Buffer creation parameters.
//!
//! Buffers back vertex and index streams in draw lists, and the uniform
//! arenas the context sub-allocates resource groups from.

use bitflags::bitflags;

bitflags! {
    /// How a buffer may be bound once created.
    ///
    /// An empty set is resolved to [`BufferUsage::VERTEX`] when the context
    /// applies [`BufferDescriptor::with_defaults`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BufferUsage: u32 {
        /// Vertex stream slot of a draw list.
        const VERTEX = 1 << 0;
        /// Index stream of an indexed draw.
        const INDEX = 1 << 1;
        /// Uniform data, including the bump arenas.
        const UNIFORM = 1 << 2;
        /// Read-write storage for compute passes.
        const STORAGE = 1 << 3;
        /// Source of indirect draw arguments.
        const INDIRECT = 1 << 4;
        const COPY_SRC = 1 << 5;
        const COPY_DST = 1 << 6;
    }
}

/// Parameters for [`GraphicsContext::make_buffer`](crate::GraphicsContext::make_buffer).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BufferDescriptor {
    pub label: Option<String>,
    /// Byte length of the allocation.
    pub size: u64,
    pub usage: BufferUsage,
}

impl BufferDescriptor {
    pub fn new(size: u64, usage: BufferUsage) -> Self {
        Self {
            size,
            usage,
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Resolves an empty usage set to a plain vertex buffer.
    pub fn with_defaults(self) -> Self {
        let usage = if self.usage.is_empty() {
            BufferUsage::VERTEX
        } else {
            self.usage
        };
        Self { usage, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_usage_becomes_vertex() {
        let desc = BufferDescriptor::new(64, BufferUsage::empty()).with_defaults();
        assert_eq!(desc.usage, BufferUsage::VERTEX);
    }

    #[test]
    fn test_explicit_usage_is_kept() {
        let desc = BufferDescriptor::new(64, BufferUsage::INDEX)
            .with_label("indices")
            .with_defaults();
        assert_eq!(desc.usage, BufferUsage::INDEX);
        assert_eq!(desc.label.as_deref(), Some("indices"));
        assert_eq!(desc.size, 64);
    }
}
