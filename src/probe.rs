use crate::error::OcrError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "tif", "bmp", "gif"];
pub const PDF_EXTENSION: &str = "pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Image,
    Pdf,
    Unsupported,
}

/// How a path given to the orchestrator will be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Probe {
    /// A `.txt` file listing one input path per line.
    FileList,
    Directory,
    File(InputKind),
}

/// Every extension (lowercase, no dot) picked up from directories by default.
pub fn supported_extensions() -> BTreeSet<String> {
    IMAGE_EXTENSIONS
        .iter()
        .chain(std::iter::once(&PDF_EXTENSION))
        .map(|s| s.to_string())
        .collect()
}

pub fn kind_for_extension(ext: &str) -> InputKind {
    let ext = ext.to_ascii_lowercase();
    if ext == PDF_EXTENSION {
        InputKind::Pdf
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        InputKind::Image
    } else {
        InputKind::Unsupported
    }
}

/// Classifies a file by extension, or by its leading bytes when it has none.
pub fn classify_file(path: &Path) -> Result<InputKind, OcrError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => Ok(kind_for_extension(ext)),
        None => sniff(path),
    }
}

fn sniff(path: &Path) -> Result<InputKind, OcrError> {
    let mut head = [0u8; 8];
    let mut f = std::fs::File::open(path)?;
    let n = f.read(&mut head)?;
    let head = &head[..n];

    let kind = if head.starts_with(b"%PDF-") {
        InputKind::Pdf
    } else if head.starts_with(b"\x89PNG")
        || head.starts_with(b"\xFF\xD8\xFF")
        || head.starts_with(b"GIF8")
        || head.starts_with(b"II*\0")
        || head.starts_with(b"MM\0*")
        || head.starts_with(b"BM")
    {
        InputKind::Image
    } else {
        InputKind::Unsupported
    };
    debug!("sniffed {} as {:?}", path.display(), kind);
    Ok(kind)
}

pub fn probe_path(path: &Path, detect_file_lists: bool) -> Result<Probe, OcrError> {
    if !path.exists() {
        return Err(OcrError::NotFound(path.to_path_buf()));
    }
    if path.is_dir() {
        return Ok(Probe::Directory);
    }
    let is_txt = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
    if detect_file_lists && is_txt && looks_like_file_list(path) {
        return Ok(Probe::FileList);
    }
    Ok(Probe::File(classify_file(path)?))
}

/// True when the first non-empty line of `path` names an existing file or directory.
fn looks_like_file_list(path: &Path) -> bool {
    match std::fs::read_to_string(path) {
        Ok(raw) => raw
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .is_some_and(|first| Path::new(first).exists()),
        Err(e) => {
            debug!("not a file list {}: {e}", path.display());
            false
        }
    }
}

pub fn read_file_list(path: &Path) -> Result<Vec<PathBuf>, OcrError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(PathBuf::from)
        .collect())
}

/// Files under `dir` whose extension is in `extensions`, sorted by path.
///
/// Extensionless files are sniffed and kept when their kind is allowed.
/// Symlinked directories are not descended into.
pub fn discover_files(
    dir: &Path,
    recursive: bool,
    extensions: &BTreeSet<String>,
) -> Result<Vec<PathBuf>, OcrError> {
    let mut out = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current)? {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                if recursive {
                    pending.push(path);
                }
                continue;
            }
            if file_type.is_symlink() && path.is_dir() {
                debug!("not following directory symlink: {}", path.display());
                continue;
            }
            if path.is_file() && allowed(&path, extensions) {
                out.push(path);
            }
        }
    }

    out.sort();
    Ok(out)
}

fn allowed(path: &Path, extensions: &BTreeSet<String>) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => extensions.contains(&ext.to_ascii_lowercase()),
        None => match sniff(path) {
            Ok(InputKind::Pdf) => extensions.contains(PDF_EXTENSION),
            Ok(InputKind::Image) => IMAGE_EXTENSIONS.iter().any(|e| extensions.contains(*e)),
            Ok(InputKind::Unsupported) => false,
            Err(e) => {
                debug!("skipping unreadable {}: {e}", path.display());
                false
            }
        },
    }
}
