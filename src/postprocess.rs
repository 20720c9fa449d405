use crate::{config::Postprocess, error::OcrError};
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Cleans engine text before it is handed back to callers.
#[derive(Debug, Clone)]
pub struct TextCleaner {
    cfg: Postprocess,
    patterns: Vec<Regex>,
}

impl TextCleaner {
    pub fn new(cfg: &Postprocess) -> Result<Self, OcrError> {
        let patterns = if cfg.remove_by_regex {
            cfg.regex
                .patterns
                .iter()
                .map(|p| {
                    Regex::new(p)
                        .map_err(|e| OcrError::InvalidConfig(format!("postprocess regex {p:?}: {e}")))
                })
                .collect::<Result<Vec<_>, _>>()?
        } else {
            Vec::new()
        };
        Ok(Self {
            cfg: cfg.clone(),
            patterns,
        })
    }

    pub fn clean(&self, raw: &str) -> String {
        let mut s = raw.to_string();

        if self.cfg.normalize_newlines {
            s = s.replace("\r\n", "\n");
        }

        // Tesseract terminates each page with a form feed.
        if self.cfg.strip_form_feeds {
            s.retain(|c| c != '\u{000C}');
        }

        if self.cfg.normalize_unicode {
            s = s.nfkc().collect::<String>();
        }

        if self.cfg.trim_trailing_whitespace {
            s = s
                .lines()
                .map(str::trim_end)
                .collect::<Vec<_>>()
                .join("\n");
            s.truncate(s.trim_end().len());
        }

        if !self.patterns.is_empty() {
            s = s
                .lines()
                .filter(|line| !self.patterns.iter().any(|r| r.is_match(line.trim())))
                .collect::<Vec<_>>()
                .join("\n");
        }

        s
    }
}

pub fn join_pages<I, S>(parts: I, separator: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        out.push_str(part.as_ref());
    }
    out
}
