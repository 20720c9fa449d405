use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the OCR library layer.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("input not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported file format '{ext}': {}", .path.display())]
    UnsupportedFormat { path: PathBuf, ext: String },

    /// An optional collaborator (PDF rasterization) is not installed or disabled.
    #[error("{capability} support is unavailable: {hint}")]
    CapabilityMissing { capability: String, hint: String },

    #[error("engine executable not found: {0}")]
    EngineNotFound(String),

    #[error("{tool} failed (exit {status:?}): {stderr}")]
    EngineFailed {
        tool: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("invalid OCR config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OcrError {
    pub fn pdf_missing(hint: impl Into<String>) -> Self {
        OcrError::CapabilityMissing {
            capability: "pdf".into(),
            hint: hint.into(),
        }
    }
}
