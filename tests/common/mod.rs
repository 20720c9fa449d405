#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tess_batch::{
    config::OcrConfig,
    engine::{Rasterizer, Recognition, RecognizeRequest, Recognizer},
    util::with_suffix,
    OcrError,
};

/// Echoes the image file's contents back as text, tagged with the language.
#[derive(Default)]
pub struct FakeRecognizer {
    pub fail_on: Option<String>,
    pub calls: RefCell<Vec<PathBuf>>,
}

impl FakeRecognizer {
    pub fn failing_on(name: &str) -> Self {
        Self {
            fail_on: Some(name.to_string()),
            ..Default::default()
        }
    }
}

impl Recognizer for FakeRecognizer {
    fn version(&self) -> Result<String, OcrError> {
        Ok("5.3.0".into())
    }

    fn recognize(&self, req: &RecognizeRequest<'_>, cfg: &OcrConfig) -> Result<Recognition, OcrError> {
        self.calls.borrow_mut().push(req.image.to_path_buf());
        let name = req.image.file_name().unwrap().to_string_lossy().into_owned();
        if let Some(bad) = &self.fail_on {
            if name.contains(bad.as_str()) {
                return Err(OcrError::EngineFailed {
                    tool: "tesseract".into(),
                    status: Some(1),
                    stderr: "Error opening data file".into(),
                });
            }
        }

        let text = format!("{}[{}]", std::fs::read_to_string(req.image)?.trim(), cfg.lang);
        let mut written = Vec::new();
        if let Some(base) = req.out_base {
            if cfg.formats.text {
                let p = with_suffix(base, "txt");
                std::fs::write(&p, &text)?;
                written.push(p);
            }
            if cfg.formats.pdf {
                let p = with_suffix(base, "pdf");
                std::fs::write(&p, format!("%PDF-1.4 {text}"))?;
                written.push(p);
            }
        }

        Ok(Recognition {
            text: req.want_text.then(|| format!("{text}\n\u{000C}")),
            written,
        })
    }
}

/// Writes `page-<n>.png` files whose content is `page <n>`.
pub struct FakeRasterizer {
    pub pages: u32,
    pub last_dir: RefCell<Option<PathBuf>>,
    pub merged: RefCell<Vec<PathBuf>>,
}

impl FakeRasterizer {
    pub fn with_pages(pages: u32) -> Self {
        Self {
            pages,
            last_dir: RefCell::new(None),
            merged: RefCell::new(Vec::new()),
        }
    }
}

impl Rasterizer for FakeRasterizer {
    fn rasterize(&self, _pdf: &Path, _dpi: u32, into_dir: &Path) -> Result<Vec<PathBuf>, OcrError> {
        *self.last_dir.borrow_mut() = Some(into_dir.to_path_buf());
        let mut out = Vec::new();
        for n in 1..=self.pages {
            let p = into_dir.join(format!("page-{n}.png"));
            std::fs::write(&p, format!("page {n}"))?;
            out.push(p);
        }
        Ok(out)
    }

    fn merge_pdfs(&self, parts: &[PathBuf], dest: &Path) -> Result<(), OcrError> {
        let mut merged = String::new();
        for p in parts {
            merged.push_str(&std::fs::read_to_string(p)?);
            self.merged.borrow_mut().push(p.clone());
        }
        std::fs::write(dest, merged)?;
        Ok(())
    }
}

pub fn touch(dir: &Path, name: &str, content: &str) -> PathBuf {
    let p = dir.join(name);
    if let Some(parent) = p.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&p, content).unwrap();
    p
}

pub fn file_count(dir: &Path) -> usize {
    let mut n = 0;
    for entry in std::fs::read_dir(dir).unwrap() {
        let p = entry.unwrap().path();
        if p.is_dir() {
            n += file_count(&p);
        } else {
            n += 1;
        }
    }
    n
}
