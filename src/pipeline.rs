use crate::{
    config::{Config, OcrConfig},
    engine::{Rasterizer, RecognizeRequest, Recognizer},
    error::OcrError,
    postprocess::{join_pages, TextCleaner},
    probe::{self, InputKind, Probe},
    util::{output_stem, with_suffix},
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Per-call knobs for [`Orchestrator::process`].
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Replaces the orchestrator's default OCR config for this call only.
    pub config: Option<OcrConfig>,
    /// Where outputs are persisted. `None` leaves nothing on disk.
    pub out_dir: Option<PathBuf>,
    pub recursive: bool,
    /// Join PDF pages into one text (and one output file) instead of per-page results.
    pub combine: bool,
    pub return_text: bool,
    /// Directory filter (lowercase, no dot). `None` falls back to config, then all supported.
    pub extensions: Option<BTreeSet<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Extracted {
    Text(String),
    /// 1-based page number to page text.
    Pages(BTreeMap<u32, String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub text: Option<Extracted>,
    pub written: Vec<PathBuf>,
    pub pages: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchEntry {
    Done(FileOutcome),
    Failed { error: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub entries: BTreeMap<PathBuf, BatchEntry>,
}

impl BatchOutcome {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn failed(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e, BatchEntry::Failed { .. }))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessOutcome {
    File(FileOutcome),
    Batch(BatchOutcome),
}

pub struct Orchestrator<R: Recognizer, P: Rasterizer> {
    cfg: Config,
    recognizer: R,
    rasterizer: Option<P>,
    cleaner: TextCleaner,
}

impl<R: Recognizer, P: Rasterizer> Orchestrator<R, P> {
    /// `rasterizer: None` disables PDF inputs; they fail with a missing-capability error.
    pub fn new(cfg: &Config, recognizer: R, rasterizer: Option<P>) -> Result<Self, OcrError> {
        Ok(Self {
            cfg: cfg.clone(),
            recognizer,
            rasterizer,
            cleaner: TextCleaner::new(&cfg.postprocess)?,
        })
    }

    pub fn default_config(&self) -> &OcrConfig {
        &self.cfg.ocr
    }

    /// Processes a file list, directory, image, or PDF.
    pub fn process(&self, path: &Path, opts: &ProcessOptions) -> Result<ProcessOutcome, OcrError> {
        match probe::probe_path(path, self.cfg.batch.detect_file_lists)? {
            Probe::FileList => {
                info!("processing file list: {}", path.display());
                Ok(ProcessOutcome::Batch(self.process_file_list(path, opts)?))
            }
            Probe::Directory => {
                info!("processing directory: {}", path.display());
                Ok(ProcessOutcome::Batch(self.process_directory(path, opts)?))
            }
            Probe::File(_) => {
                info!("processing file: {}", path.display());
                Ok(ProcessOutcome::File(self.process_file(path, opts)?))
            }
        }
    }

    pub fn process_file(&self, path: &Path, opts: &ProcessOptions) -> Result<FileOutcome, OcrError> {
        self.process_file_into(path, opts, opts.out_dir.as_deref())
    }

    pub fn process_directory(
        &self,
        dir: &Path,
        opts: &ProcessOptions,
    ) -> Result<BatchOutcome, OcrError> {
        if !dir.is_dir() {
            return Err(OcrError::NotFound(dir.to_path_buf()));
        }
        let extensions = self.batch_extensions(opts);
        let files = probe::discover_files(dir, opts.recursive, &extensions)?;
        debug!("{} candidate files under {}", files.len(), dir.display());

        let mut batch = BatchOutcome::default();
        for file in files {
            let out_dir = opts
                .out_dir
                .as_deref()
                .map(|out| mirrored_out_dir(out, dir, &file));
            let entry = self.batch_entry(&file, opts, out_dir.as_deref());
            batch.entries.insert(file, entry);
        }
        Ok(batch)
    }

    pub fn process_file_list(
        &self,
        list: &Path,
        opts: &ProcessOptions,
    ) -> Result<BatchOutcome, OcrError> {
        let mut batch = BatchOutcome::default();
        for file in probe::read_file_list(list)? {
            if file.is_file() && matches!(probe::classify_file(&file), Ok(InputKind::Unsupported)) {
                warn!("skipping unsupported file: {}", file.display());
                continue;
            }
            let entry = self.batch_entry(&file, opts, opts.out_dir.as_deref());
            batch.entries.insert(file, entry);
        }
        Ok(batch)
    }

    fn batch_entry(&self, file: &Path, opts: &ProcessOptions, out_dir: Option<&Path>) -> BatchEntry {
        match self.process_file_into(file, opts, out_dir) {
            Ok(outcome) => {
                info!("processed: {}", file.display());
                BatchEntry::Done(outcome)
            }
            Err(err) => {
                error!("error processing {}: {err}", file.display());
                BatchEntry::Failed {
                    error: err.to_string(),
                }
            }
        }
    }

    fn batch_extensions(&self, opts: &ProcessOptions) -> BTreeSet<String> {
        if let Some(exts) = &opts.extensions {
            return exts.iter().map(|e| normalize_ext(e)).collect();
        }
        if !self.cfg.batch.extensions.is_empty() {
            return self
                .cfg
                .batch
                .extensions
                .iter()
                .map(|e| normalize_ext(e))
                .collect();
        }
        probe::supported_extensions()
    }

    fn process_file_into(
        &self,
        path: &Path,
        opts: &ProcessOptions,
        out_dir: Option<&Path>,
    ) -> Result<FileOutcome, OcrError> {
        if !path.exists() {
            return Err(OcrError::NotFound(path.to_path_buf()));
        }
        let cfg = opts.config.as_ref().unwrap_or(&self.cfg.ocr);
        let base = output_stem(path);

        match probe::classify_file(path)? {
            InputKind::Image => {
                let out_base = match out_dir {
                    Some(dir) => {
                        std::fs::create_dir_all(dir)?;
                        Some(dir.join(&base))
                    }
                    None => None,
                };
                let (text, written) =
                    self.recognize(path, out_base.as_deref(), opts.return_text, cfg)?;
                Ok(FileOutcome {
                    text: text.map(Extracted::Text),
                    written,
                    pages: 1,
                })
            }
            InputKind::Pdf => self.process_pdf(path, &base, cfg, out_dir, opts),
            InputKind::Unsupported => Err(OcrError::UnsupportedFormat {
                path: path.to_path_buf(),
                ext: path
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            }),
        }
    }

    fn recognize(
        &self,
        image: &Path,
        out_base: Option<&Path>,
        want_text: bool,
        cfg: &OcrConfig,
    ) -> Result<(Option<String>, Vec<PathBuf>), OcrError> {
        debug!("recognizing {}", image.display());
        let req = RecognizeRequest {
            image,
            out_base,
            want_text,
        };
        let rec = self.recognizer.recognize(&req, cfg)?;
        let text = rec.text.map(|t| self.cleaner.clean(&t));
        Ok((text, rec.written))
    }

    fn process_pdf(
        &self,
        pdf: &Path,
        base: &str,
        cfg: &OcrConfig,
        out_dir: Option<&Path>,
        opts: &ProcessOptions,
    ) -> Result<FileOutcome, OcrError> {
        let rasterizer = self.rasterizer.as_ref().ok_or_else(|| {
            OcrError::pdf_missing("PDF support is disabled (enable [pdf] and install poppler-utils)")
        })?;

        // Page images live only as long as this directory handle, on every exit path.
        let scratch = tempfile::Builder::new().prefix("tess-batch-").tempdir()?;
        info!("rasterizing {} at {} dpi", pdf.display(), cfg.dpi);
        let images = rasterizer.rasterize(pdf, cfg.dpi, scratch.path())?;

        let combine = opts.combine;
        if images.is_empty() {
            warn!("no pages found in PDF: {}", pdf.display());
            return Ok(FileOutcome {
                text: opts.return_text.then(|| empty_extracted(combine)),
                written: Vec::new(),
                pages: 0,
            });
        }

        let page_dir = match out_dir {
            Some(dir) if combine => Some(dir.join("pages").join(base)),
            Some(dir) => Some(dir.to_path_buf()),
            None => None,
        };
        if let Some(dir) = &page_dir {
            std::fs::create_dir_all(dir)?;
        }
        let want_text = opts.return_text || (combine && out_dir.is_some());

        let mut texts = BTreeMap::new();
        let mut written = Vec::new();
        let mut page_pdfs = Vec::new();
        for (i, image) in images.iter().enumerate() {
            let page = i as u32 + 1;
            let out_base = page_dir
                .as_ref()
                .map(|dir| dir.join(format!("{base}_page_{page}")));
            let (text, files) = self.recognize(image, out_base.as_deref(), want_text, cfg)?;

            page_pdfs.extend(
                files
                    .iter()
                    .filter(|f| f.extension().is_some_and(|e| e == "pdf"))
                    .cloned(),
            );
            written.extend(files);
            if let Some(text) = text {
                texts.insert(page, text);
            }
        }

        let text = if combine {
            let joined = join_pages(texts.values(), &self.cfg.output.page_separator);
            if let Some(dir) = out_dir {
                let combined_txt = with_suffix(&dir.join(base), "txt");
                std::fs::write(&combined_txt, &joined)?;
                info!("wrote combined text: {}", combined_txt.display());
                written.push(combined_txt);

                if cfg.formats.pdf && !page_pdfs.is_empty() {
                    let combined_pdf = with_suffix(&dir.join(base), "pdf");
                    match rasterizer.merge_pdfs(&page_pdfs, &combined_pdf) {
                        Ok(()) => {
                            info!("wrote combined PDF: {}", combined_pdf.display());
                            written.push(combined_pdf);
                        }
                        Err(err) => warn!("failed to merge page PDFs for {}: {err}", pdf.display()),
                    }
                }
            }
            opts.return_text.then_some(Extracted::Text(joined))
        } else {
            opts.return_text.then_some(Extracted::Pages(texts))
        };

        Ok(FileOutcome {
            text,
            written,
            pages: images.len() as u32,
        })
    }
}

fn empty_extracted(combine: bool) -> Extracted {
    if combine {
        Extracted::Text(String::new())
    } else {
        Extracted::Pages(BTreeMap::new())
    }
}

fn normalize_ext(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// `out` extended by the subdirectory `file` sits in relative to `root`.
fn mirrored_out_dir(out: &Path, root: &Path, file: &Path) -> PathBuf {
    file.parent()
        .and_then(|parent| parent.strip_prefix(root).ok())
        .map(|rel| out.join(rel))
        .unwrap_or_else(|| out.to_path_buf())
}
