use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy)]
pub struct RecognizeRequest<'a> {
    pub image: &'a Path,
    /// Base path for persisted outputs (`<out_base>.txt`, `<out_base>.pdf`, ...).
    /// `None` means nothing may be left on disk.
    pub out_base: Option<&'a Path>,
    pub want_text: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Recognition {
    /// Raw engine text, present when the request asked for it.
    pub text: Option<String>,
    /// Files left on disk under `out_base`.
    pub written: Vec<PathBuf>,
}
