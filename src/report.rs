use crate::{
    pipeline::{BatchEntry, FileOutcome, ProcessOutcome},
    util::hash_file,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started: String,
    pub finished: String,
    pub input: String,
    pub entries: Vec<EntryReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryReport {
    pub path: String,
    pub sha256: Option<String>,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    pub pages: u32,
    pub written: Vec<String>,
}

impl RunReport {
    pub fn from_outcome(input: &Path, outcome: &ProcessOutcome, started: String, finished: String) -> Self {
        let entries = match outcome {
            ProcessOutcome::File(file) => vec![EntryReport::done(input, file)],
            ProcessOutcome::Batch(batch) => batch
                .entries
                .iter()
                .map(|(path, entry)| match entry {
                    BatchEntry::Done(file) => EntryReport::done(path, file),
                    BatchEntry::Failed { error } => EntryReport {
                        path: path.display().to_string(),
                        sha256: hash_file(path).ok(),
                        ok: false,
                        error: Some(error.clone()),
                        pages: 0,
                        written: Vec::new(),
                    },
                })
                .collect(),
        };

        Self {
            started,
            finished,
            input: input.display().to_string(),
            entries,
        }
    }

    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|e| !e.ok).count()
    }
}

impl EntryReport {
    fn done(path: &Path, file: &FileOutcome) -> Self {
        Self {
            path: path.display().to_string(),
            sha256: hash_file(path).ok(),
            ok: true,
            error: None,
            pages: file.pages,
            written: file.written.iter().map(|p| p.display().to_string()).collect(),
        }
    }
}
