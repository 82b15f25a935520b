//! Errors surfaced through [`GraphicsContext::last_error`](crate::GraphicsContext::last_error).

use lattice_core::PoolError;

/// Recoverable errors reported by the graphics context.
///
/// Resource creation functions never return these directly. They store the
/// error as the context's last error, log it and hand back a null handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphicsError {
    /// The backend could not allocate the object.
    #[error("resource creation failed: {0}")]
    ResourceCreationFailed(String),
    #[error("shader compilation failed for {label}: {message}")]
    ShaderCompilation {
        /// Debug label of the shader, or `"<unnamed>"`.
        label: String,
        /// Backend diagnostic.
        message: String,
    },
    /// A descriptor or setup value is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// The backend refused work the context had already validated.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphicsError::InvalidParameter("alignment must be a power of 2".to_string());
        assert_eq!(
            err.to_string(),
            "invalid parameter: alignment must be a power of 2"
        );

        let err = GraphicsError::ShaderCompilation {
            label: "sky".to_string(),
            message: "empty vertex source".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "shader compilation failed for sky: empty vertex source"
        );
    }

    #[test]
    fn test_pool_error_converts() {
        let err: GraphicsError = PoolError::Exhausted {
            kind: "buffer",
            capacity: 4,
        }
        .into();
        assert!(matches!(err, GraphicsError::Pool(_)));
    }
}
