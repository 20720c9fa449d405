pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod postprocess;
pub mod probe;
pub mod report;
pub mod util;

pub use config::{Config, ConfigOverrides, OcrConfig, OutputFormats};
pub use error::OcrError;
pub use pipeline::{BatchEntry, BatchOutcome, Extracted, FileOutcome, Orchestrator, ProcessOptions, ProcessOutcome};
