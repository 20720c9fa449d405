pub mod poppler;
pub mod tesseract;
pub mod types;

use crate::{config::OcrConfig, error::OcrError};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

pub use poppler::PopplerRasterizer;
pub use tesseract::TesseractEngine;
pub use types::{Recognition, RecognizeRequest};

/// Turns one raster image into text, optionally writing side files.
pub trait Recognizer {
    fn version(&self) -> Result<String, OcrError>;
    fn recognize(&self, req: &RecognizeRequest<'_>, cfg: &OcrConfig) -> Result<Recognition, OcrError>;
}

/// Splits a PDF into one image per page, and stitches per-page PDFs back together.
pub trait Rasterizer {
    /// Renders every page of `pdf` into `into_dir`. Returned paths are in page order.
    fn rasterize(&self, pdf: &Path, dpi: u32, into_dir: &Path) -> Result<Vec<PathBuf>, OcrError>;
    fn merge_pdfs(&self, parts: &[PathBuf], dest: &Path) -> Result<(), OcrError>;
}

impl<T: Recognizer + ?Sized> Recognizer for &T {
    fn version(&self) -> Result<String, OcrError> {
        (**self).version()
    }

    fn recognize(&self, req: &RecognizeRequest<'_>, cfg: &OcrConfig) -> Result<Recognition, OcrError> {
        (**self).recognize(req, cfg)
    }
}

impl<T: Rasterizer + ?Sized> Rasterizer for &T {
    fn rasterize(&self, pdf: &Path, dpi: u32, into_dir: &Path) -> Result<Vec<PathBuf>, OcrError> {
        (**self).rasterize(pdf, dpi, into_dir)
    }

    fn merge_pdfs(&self, parts: &[PathBuf], dest: &Path) -> Result<(), OcrError> {
        (**self).merge_pdfs(parts, dest)
    }
}

/// Runs an external tool to completion, capturing its output.
///
/// A missing executable is reported through `on_missing`; a non-zero exit
/// becomes [`OcrError::EngineFailed`] carrying stderr.
pub(crate) fn run_tool(
    cmd: &mut Command,
    tool: &str,
    on_missing: impl FnOnce() -> OcrError,
) -> Result<Output, OcrError> {
    debug!("exec {:?}", cmd);
    let output = match cmd.output() {
        Ok(output) => output,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(on_missing()),
        Err(e) => return Err(OcrError::Io(e)),
    };

    if !output.status.success() {
        return Err(OcrError::EngineFailed {
            tool: tool.to_string(),
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    if !output.stderr.is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("{tool} stderr: {}", stderr.trim());
    }

    Ok(output)
}
