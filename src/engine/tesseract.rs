use super::{run_tool, Recognition, RecognizeRequest, Recognizer};
use crate::{
    config::{Config, OcrConfig, OutputFormats},
    error::OcrError,
    util::{expand_tilde, with_suffix},
};
use regex::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;
use tempfile::TempDir;
use tracing::{debug, warn};

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^tesseract\s+v?(\d[^\s]*)").expect("static regex"));

/// Tesseract driven through its command-line interface.
pub struct TesseractEngine {
    exe: PathBuf,
}

impl TesseractEngine {
    pub fn new(cfg: &Config) -> Self {
        Self {
            exe: resolve_tesseract_exe(&cfg.engine.tesseract_cmd),
        }
    }

    pub fn with_exe(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into() }
    }

    pub fn exe(&self) -> &Path {
        &self.exe
    }

    fn missing(&self) -> OcrError {
        OcrError::EngineNotFound(format!(
            "'{}' (install tesseract-ocr or set engine.tesseract_cmd)",
            self.exe.display()
        ))
    }
}

/// Full argument list for one engine run: `<image> <out_base> <options> <formats>`.
pub fn build_args(
    image: &Path,
    out_base: &Path,
    cfg: &OcrConfig,
    formats: &OutputFormats,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![image.into(), out_base.into()];
    args.extend(cfg.to_cmd_args().into_iter().map(OsString::from));
    args.extend(formats.engine_names().into_iter().map(OsString::from));
    args
}

pub fn parse_version(raw: &str) -> Option<String> {
    VERSION_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

impl Recognizer for TesseractEngine {
    fn version(&self) -> Result<String, OcrError> {
        let output = run_tool(
            Command::new(&self.exe).arg("--version"),
            "tesseract",
            || self.missing(),
        )?;
        // Older releases print the banner on stderr.
        let mut banner = String::from_utf8_lossy(&output.stdout).into_owned();
        banner.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(parse_version(&banner)
            .unwrap_or_else(|| banner.lines().next().unwrap_or_default().trim().to_string()))
    }

    fn recognize(&self, req: &RecognizeRequest<'_>, cfg: &OcrConfig) -> Result<Recognition, OcrError> {
        let scratch;
        let (base, persist) = match req.out_base {
            Some(base) => (base.to_path_buf(), cfg.formats),
            None => {
                scratch = TempDir::new()?;
                (scratch.path().join("out"), OutputFormats::none())
            }
        };

        let mut formats = persist;
        if req.want_text {
            formats.text = true;
        }

        let args = build_args(req.image, &base, cfg, &formats);
        debug!(image = %req.image.display(), "tesseract {:?}", args);
        run_tool(Command::new(&self.exe).args(&args), "tesseract", || self.missing())?;

        let txt_path = with_suffix(&base, "txt");
        let text = if req.want_text {
            match std::fs::read_to_string(&txt_path) {
                Ok(text) => Some(text),
                Err(e) => {
                    return Err(OcrError::EngineFailed {
                        tool: "tesseract".into(),
                        status: Some(0),
                        stderr: format!("no text output at {}: {e}", txt_path.display()),
                    });
                }
            }
        } else {
            None
        };

        // Text needed only for the caller is not left behind in the output dir.
        if req.out_base.is_some() && !persist.text && txt_path.exists() {
            if let Err(e) = std::fs::remove_file(&txt_path) {
                warn!("failed to remove {}: {e}", txt_path.display());
            }
        }

        let written = if req.out_base.is_some() {
            persist
                .engine_names()
                .into_iter()
                .map(|ext| with_suffix(&base, ext))
                .filter(|p| p.exists())
                .collect()
        } else {
            Vec::new()
        };

        Ok(Recognition { text, written })
    }
}

fn resolve_tesseract_exe(raw: &str) -> PathBuf {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("auto") {
        if let Ok(env_val) = std::env::var("TESSERACT_CMD") {
            let p = expand_tilde(&env_val);
            if p.exists() {
                return p;
            }
        }
        return PathBuf::from("tesseract");
    }
    expand_tilde(raw)
}
