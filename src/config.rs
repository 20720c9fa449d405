use crate::error::OcrError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub engine: Engine,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub pdf: Pdf,
    #[serde(default)]
    pub batch: Batch,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub postprocess: Postprocess,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub security: Security,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// Loads `path` when it exists, otherwise falls back to built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Global {
    pub print_summary: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Engine {
    /// Tesseract executable. `auto` consults `TESSERACT_CMD`, then `tesseract` on PATH.
    pub tesseract_cmd: String,
    pub verify_on_start: bool,
}
impl Default for Engine {
    fn default() -> Self {
        Self {
            tesseract_cmd: "auto".into(),
            verify_on_start: true,
        }
    }
}

/// Recognition parameters handed to the engine for every image.
///
/// Treated as an immutable value: per-call changes go through
/// [`OcrConfig::overridden`] or the `with_*` builders, which return a new
/// config and leave the original alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Language code(s), `+`-joined (`eng`, `jpn+eng`).
    pub lang: String,
    /// Rasterization resolution for PDF pages.
    pub dpi: u32,
    /// Page segmentation mode (0-13, range checked by tesseract). 3 is fully automatic.
    pub psm: u32,
    /// OCR engine mode (0-3). 3 picks whatever is available, LSTM first.
    pub oem: u32,
    /// Extra engine arguments, whitespace-separated.
    pub config_string: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tessdata_dir: Option<String>,
    pub formats: OutputFormats,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            lang: "eng".into(),
            dpi: 300,
            psm: 3,
            oem: 3,
            config_string: String::new(),
            tessdata_dir: None,
            formats: OutputFormats::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputFormats {
    pub text: bool,
    /// Searchable PDF (page image with an invisible text layer).
    pub pdf: bool,
    pub hocr: bool,
}

impl Default for OutputFormats {
    fn default() -> Self {
        Self::text_only()
    }
}

impl OutputFormats {
    pub fn text_only() -> Self {
        Self {
            text: true,
            pdf: false,
            hocr: false,
        }
    }

    pub fn none() -> Self {
        Self {
            text: false,
            pdf: false,
            hocr: false,
        }
    }

    /// Tesseract config-file names, in command-line order. Each one is also
    /// the extension of the file the engine writes for it.
    pub fn engine_names(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.pdf {
            out.push("pdf");
        }
        if self.hocr {
            out.push("hocr");
        }
        if self.text {
            out.push("txt");
        }
        out
    }
}

/// Optional per-call overrides. `None` keeps the base value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub lang: Option<String>,
    pub dpi: Option<u32>,
    pub psm: Option<u32>,
    pub oem: Option<u32>,
    pub config_string: Option<String>,
    pub tessdata_dir: Option<String>,
    pub formats: Option<OutputFormats>,
}

impl OcrConfig {
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn with_psm(mut self, psm: u32) -> Self {
        self.psm = psm;
        self
    }

    pub fn with_oem(mut self, oem: u32) -> Self {
        self.oem = oem;
        self
    }

    pub fn with_config_string(mut self, s: impl Into<String>) -> Self {
        self.config_string = s.into();
        self
    }

    pub fn with_formats(mut self, formats: OutputFormats) -> Self {
        self.formats = formats;
        self
    }

    pub fn overridden(&self, ov: &ConfigOverrides) -> OcrConfig {
        let mut cfg = self.clone();
        if let Some(lang) = &ov.lang {
            cfg.lang = lang.clone();
        }
        if let Some(dpi) = ov.dpi {
            cfg.dpi = dpi;
        }
        if let Some(psm) = ov.psm {
            cfg.psm = psm;
        }
        if let Some(oem) = ov.oem {
            cfg.oem = oem;
        }
        if let Some(s) = &ov.config_string {
            cfg.config_string = s.clone();
        }
        if let Some(dir) = &ov.tessdata_dir {
            cfg.tessdata_dir = Some(dir.clone());
        }
        if let Some(formats) = ov.formats {
            cfg.formats = formats;
        }
        cfg
    }

    /// Parses a Tesseract-style option string such as `-l eng+jpn --psm 6 --oem 1 pdf`.
    ///
    /// Recognized flags set their field; `pdf` and `hocr` switch on those
    /// outputs; anything else lands in `config_string` in order.
    pub fn from_cli_string(s: &str) -> Result<OcrConfig, OcrError> {
        let mut cfg = OcrConfig::default();
        let parts: Vec<&str> = s.split_whitespace().collect();
        let mut extra: Vec<&str> = Vec::new();

        let mut i = 0;
        while i < parts.len() {
            let has_value = i + 1 < parts.len();
            match parts[i] {
                "-l" if has_value => {
                    cfg.lang = parts[i + 1].to_string();
                    i += 2;
                }
                "--psm" if has_value => {
                    cfg.psm = parse_mode("--psm", parts[i + 1])?;
                    i += 2;
                }
                "--oem" if has_value => {
                    cfg.oem = parse_mode("--oem", parts[i + 1])?;
                    i += 2;
                }
                "--dpi" if has_value => {
                    cfg.dpi = parts[i + 1].parse().map_err(|_| {
                        OcrError::InvalidConfig(format!("--dpi expects an integer, got '{}'", parts[i + 1]))
                    })?;
                    i += 2;
                }
                "--tessdata-dir" if has_value => {
                    cfg.tessdata_dir = Some(parts[i + 1].to_string());
                    i += 2;
                }
                "pdf" => {
                    cfg.formats.pdf = true;
                    i += 1;
                }
                "hocr" => {
                    cfg.formats.hocr = true;
                    i += 1;
                }
                other => {
                    extra.push(other);
                    i += 1;
                }
            }
        }

        cfg.config_string = extra.join(" ");
        Ok(cfg)
    }

    /// Recognition arguments, excluding input/output paths and output formats.
    pub fn to_cmd_args(&self) -> Vec<String> {
        let mut args = vec![
            "-l".to_string(),
            self.lang.clone(),
            "--psm".to_string(),
            self.psm.to_string(),
            "--oem".to_string(),
            self.oem.to_string(),
        ];
        args.extend(self.config_string.split_whitespace().map(str::to_string));
        if let Some(dir) = self.tessdata_dir.as_deref().filter(|d| !d.is_empty()) {
            args.push("--tessdata-dir".into());
            args.push(dir.to_string());
        }
        args
    }
}

fn parse_mode(flag: &str, raw: &str) -> Result<u32, OcrError> {
    raw.parse()
        .map_err(|_| OcrError::InvalidConfig(format!("{flag} expects an integer, got '{raw}'")))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Pdf {
    /// When false, PDF inputs fail with a missing-capability error.
    pub enabled: bool,
    pub pdftoppm_cmd: String,
    pub pdfunite_cmd: String,
}
impl Default for Pdf {
    fn default() -> Self {
        Self {
            enabled: true,
            pdftoppm_cmd: "pdftoppm".into(),
            pdfunite_cmd: "pdfunite".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Batch {
    pub recursive: bool,
    /// Extensions (without dot) picked up from directories. Empty means all supported.
    pub extensions: Vec<String>,
    /// Treat a `.txt` input whose first line names an existing file as a list of inputs.
    pub detect_file_lists: bool,
}
impl Default for Batch {
    fn default() -> Self {
        Self {
            recursive: false,
            extensions: Vec::new(),
            detect_file_lists: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub out_dir: String,
    pub combine_pages: bool,
    pub page_separator: String,
    pub write_report_json: bool,
    pub report_filename: String,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            out_dir: "".into(),
            combine_pages: false,
            page_separator: "\n\n".into(),
            write_report_json: true,
            report_filename: "report.json".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Postprocess {
    pub normalize_newlines: bool,
    pub strip_form_feeds: bool,
    pub normalize_unicode: bool,
    pub trim_trailing_whitespace: bool,
    pub remove_by_regex: bool,
    pub regex: PostprocessRegex,
}
impl Default for Postprocess {
    fn default() -> Self {
        Self {
            normalize_newlines: true,
            strip_form_feeds: true,
            // NFKC folds half-width kana and full-width latin, which changes CJK output.
            normalize_unicode: false,
            trim_trailing_whitespace: true,
            remove_by_regex: false,
            regex: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostprocessRegex {
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Security {
    pub reject_url_inputs: bool,
}
impl Default for Security {
    fn default() -> Self {
        Self {
            reject_url_inputs: true,
        }
    }
}
