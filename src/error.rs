//! Error types for the icon pipeline.

use std::io;

/// Result alias used throughout the crate.
pub type Result<T, E = IconError> = std::result::Result<T, E>;

/// Boxed error returned by external collaborators (background removal,
/// vector tracing).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Every failure the pipeline can surface to its caller.
///
/// No variant is ever swallowed inside the crate: a failing step aborts the
/// current generation and the error is returned as-is.
#[derive(Debug, thiserror::Error)]
pub enum IconError {
    /// Invalid [`ProcessorConfig`](crate::ProcessorConfig) or preset data.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A raster surface or image buffer could not be allocated.
    #[error("allocation failed: {0}")]
    Allocation(String),

    /// Encoding an image to bytes failed.
    #[error("encode failed: {0}")]
    Encode(String),

    /// Resampling to a target size failed.
    #[error("resize failed: {0}")]
    Resize(String),

    /// The source bytes are not a decodable image.
    #[error("decode failed: {0}")]
    Decode(String),

    /// Writing an asset to its destination failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// A JSON document (config, catalog, manifest) could not be processed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IconError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn allocation(msg: impl Into<String>) -> Self {
        Self::Allocation(msg.into())
    }

    pub(crate) fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub(crate) fn resize(msg: impl Into<String>) -> Self {
        Self::Resize(msg.into())
    }

    /// Returns true if the error was caused by caller-supplied data
    /// rather than the environment.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = IconError::config("padding must be within [0, 0.5]");
        assert_eq!(
            err.to_string(),
            "invalid configuration: padding must be within [0, 0.5]"
        );
        assert!(err.is_config());
        assert!(!IconError::resize("0x0").is_config());
    }

    #[test]
    fn io_errors_convert() {
        let err: IconError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, IconError::Io(_)));
    }
}
