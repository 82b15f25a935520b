//! Shader descriptors.

/// Descriptor for creating a render shader (vertex + fragment stage).
///
/// Sources are handed to the backend untouched; cross-compilation happens
/// before they reach this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ShaderDescriptor {
    /// Debug label for the shader.
    pub label: Option<String>,
    /// Vertex stage source.
    pub vertex_source: String,
    /// Vertex stage entry point. Empty means `"main"`.
    pub vertex_entry: String,
    /// Fragment stage source.
    pub fragment_source: String,
    /// Fragment stage entry point. Empty means `"main"`.
    pub fragment_entry: String,
}

impl ShaderDescriptor {
    /// Create a shader descriptor from both stage sources.
    pub fn new(vertex_source: impl Into<String>, fragment_source: impl Into<String>) -> Self {
        Self {
            vertex_source: vertex_source.into(),
            fragment_source: fragment_source.into(),
            ..Default::default()
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Fill unset fields with their defaults.
    pub fn with_defaults(mut self) -> Self {
        if self.vertex_entry.is_empty() {
            self.vertex_entry = "main".to_string();
        }
        if self.fragment_entry.is_empty() {
            self.fragment_entry = "main".to_string();
        }
        self
    }
}
