//! Error types for backend loading

/// Errors that can occur while constructing a classifier backend
///
/// Construction failures are recoverable per backend: the loader skips
/// the failed bundle and keeps going.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Missing resource: {0}")]
    MissingResource(String),

    #[error("Malformed model resource {resource}: {reason}")]
    MalformedModel { resource: String, reason: String },

    #[error("Label list {resource} does not match model: {reason}")]
    LabelMismatch { resource: String, reason: String },

    #[error("Failed to parse model resource: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Backend loader task terminated before reporting")]
    LoaderDied,
}
