use super::{run_tool, Rasterizer};
use crate::{
    config::Config,
    error::OcrError,
    util::expand_tilde,
};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// PDF rasterization and merging through poppler-utils (`pdftoppm`, `pdfunite`).
pub struct PopplerRasterizer {
    pdftoppm: PathBuf,
    pdfunite: PathBuf,
}

impl PopplerRasterizer {
    pub fn new(cfg: &Config) -> Self {
        Self {
            pdftoppm: expand_tilde(&cfg.pdf.pdftoppm_cmd),
            pdfunite: expand_tilde(&cfg.pdf.pdfunite_cmd),
        }
    }

    pub fn is_available(&self) -> bool {
        Command::new(&self.pdftoppm)
            .arg("-v")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }
}

impl Rasterizer for PopplerRasterizer {
    fn rasterize(&self, pdf: &Path, dpi: u32, into_dir: &Path) -> Result<Vec<PathBuf>, OcrError> {
        let prefix = into_dir.join("page");
        run_tool(
            Command::new(&self.pdftoppm)
                .args(["-png", "-r"])
                .arg(dpi.to_string())
                .arg(pdf)
                .arg(&prefix),
            "pdftoppm",
            || OcrError::pdf_missing("pdftoppm not found (install poppler-utils)"),
        )?;

        let mut pages: Vec<(u32, PathBuf)> = std::fs::read_dir(into_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter_map(|p| page_number(&p).map(|n| (n, p)))
            .collect();
        // pdftoppm pads page numbers to the width of the page count; sort numerically anyway.
        pages.sort_by_key(|(n, _)| *n);
        debug!("rasterized {} pages from {}", pages.len(), pdf.display());

        Ok(pages.into_iter().map(|(_, p)| p).collect())
    }

    fn merge_pdfs(&self, parts: &[PathBuf], dest: &Path) -> Result<(), OcrError> {
        run_tool(
            Command::new(&self.pdfunite).args(parts).arg(dest),
            "pdfunite",
            || OcrError::pdf_missing("pdfunite not found (install poppler-utils)"),
        )?;
        Ok(())
    }
}

/// Page number of a `page-<n>.png` file written by pdftoppm.
pub fn page_number(path: &Path) -> Option<u32> {
    if path.extension().and_then(|e| e.to_str()) != Some("png") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix("page-")?.parse().ok()
}
