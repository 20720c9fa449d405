use crate::{
    config::{Config, ConfigOverrides, OcrConfig},
    engine::{PopplerRasterizer, Recognizer, TesseractEngine},
    pipeline::{Orchestrator, ProcessOptions, ProcessOutcome},
    report::RunReport,
    util::{ensure_dir, looks_like_url, now_rfc3339},
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "tess-batch")]
#[command(about = "Batch OCR over images, PDFs, directories and file lists (Tesseract CLI)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./tess-batch.toml if present, else defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report the engine version and PDF support.
    Doctor {},
    /// Show how an input path would be handled.
    Classify {
        #[arg(long)]
        input: PathBuf,
    },
    /// OCR the input and print a JSON summary.
    Run(RunArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct RunArgs {
    /// Image, PDF, directory, or a .txt file listing inputs.
    #[arg(long)]
    pub input: PathBuf,
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
    #[arg(long)]
    pub recursive: bool,
    /// Join PDF pages into a single text.
    #[arg(long)]
    pub combine: bool,
    /// Include extracted text in the printed summary.
    #[arg(long)]
    pub print_text: bool,
    #[arg(long)]
    pub lang: Option<String>,
    #[arg(long)]
    pub psm: Option<u32>,
    #[arg(long)]
    pub oem: Option<u32>,
    #[arg(long)]
    pub dpi: Option<u32>,
    /// Tesseract-style options (`-l jpn+eng --psm 6 pdf`); replaces the [ocr] section.
    #[arg(long)]
    pub ocr_args: Option<String>,
    /// Restrict directory batches to these extensions. Repeatable.
    #[arg(long = "ext")]
    pub extensions: Vec<String>,
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref());
    let cfg = match args.config.as_deref() {
        Some(_) => Config::load(&cfg_path)?,
        None => Config::load_or_default(&cfg_path)?,
    };

    match &args.cmd {
        Command::Doctor {} => {
            let log_path = resolve_log_path(&cfg, None);
            let _guard = init_logging(&args, &cfg, log_path.as_deref())?;
            doctor(&cfg)
        }
        Command::Classify { input } => {
            let log_path = resolve_log_path(&cfg, None);
            let _guard = init_logging(&args, &cfg, log_path.as_deref())?;
            classify(&cfg, input)
        }
        Command::Run(run_args) => run(&args, &cfg, run_args),
    }
}

fn resolve_config_path(user: Option<&Path>) -> PathBuf {
    match user {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from("tess-batch.toml"),
    }
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the JSON summary, so logs go to stderr.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn doctor(cfg: &Config) -> Result<()> {
    let engine = TesseractEngine::new(cfg);
    let version = engine.version();
    let rasterizer = PopplerRasterizer::new(cfg);
    let pdf_ok = cfg.pdf.enabled && rasterizer.is_available();

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "tesseract_cmd": engine.exe(),
            "tesseract_version": version.as_ref().ok(),
            "tesseract_error": version.as_ref().err().map(|e| e.to_string()),
            "pdf_enabled": cfg.pdf.enabled,
            "pdf_available": pdf_ok,
            "ok": version.is_ok(),
        }))?
    );
    Ok(())
}

fn classify(cfg: &Config, input: &Path) -> Result<()> {
    validate_input(cfg, input)?;
    let probe = crate::probe::probe_path(input, cfg.batch.detect_file_lists)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "input": input,
            "probe": probe,
        }))?
    );
    Ok(())
}

fn run(args: &Args, cfg: &Config, run_args: &RunArgs) -> Result<()> {
    let input = run_args.input.as_path();
    let out_dir = run_args.out_dir.clone().or_else(|| {
        (!cfg.output.out_dir.is_empty()).then(|| PathBuf::from(&cfg.output.out_dir))
    });

    let log_path = resolve_log_path(cfg, out_dir.as_deref());
    let _guard = init_logging(args, cfg, log_path.as_deref())?;

    validate_input(cfg, input)?;
    if let Some(dir) = &out_dir {
        ensure_dir(dir)?;
    }

    let engine = TesseractEngine::new(cfg);
    if cfg.engine.verify_on_start {
        let version = engine.version().context("verifying tesseract")?;
        info!("using tesseract {version} ({})", engine.exe().display());
    }
    let rasterizer = if cfg.pdf.enabled {
        Some(PopplerRasterizer::new(cfg))
    } else {
        warn!("PDF support disabled by config; PDF inputs will fail");
        None
    };
    let orchestrator = Orchestrator::new(cfg, engine, rasterizer)?;

    let options = ProcessOptions {
        config: Some(effective_ocr_config(cfg, run_args)?),
        out_dir: out_dir.clone(),
        recursive: run_args.recursive || cfg.batch.recursive,
        combine: run_args.combine || cfg.output.combine_pages,
        return_text: run_args.print_text,
        extensions: (!run_args.extensions.is_empty())
            .then(|| run_args.extensions.iter().cloned().collect()),
    };

    let started = now_rfc3339();
    let outcome = orchestrator
        .process(input, &options)
        .with_context(|| format!("processing {}", input.display()))?;

    if let ProcessOutcome::Batch(batch) = &outcome {
        info!("batch finished: {} entries, {} failed", batch.len(), batch.failed());
        if batch.failed() > 0 {
            warn!("{} of {} inputs failed", batch.failed(), batch.len());
        }
    }

    if let Some(dir) = out_dir.as_deref().filter(|_| cfg.output.write_report_json) {
        let report = RunReport::from_outcome(input, &outcome, started, now_rfc3339());
        let path = dir.join(&cfg.output.report_filename);
        std::fs::write(&path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("writing report: {}", path.display()))?;
    }

    if cfg.global.print_summary || run_args.print_text {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "input": input,
                "out_dir": out_dir,
                "outcome": outcome,
            }))?
        );
    }

    Ok(())
}

/// The `[ocr]` section (or `--ocr-args`) with any per-flag overrides applied.
pub fn effective_ocr_config(cfg: &Config, run_args: &RunArgs) -> Result<OcrConfig> {
    let base = match run_args.ocr_args.as_deref() {
        Some(raw) => OcrConfig::from_cli_string(raw).context("parsing --ocr-args")?,
        None => cfg.ocr.clone(),
    };
    Ok(base.overridden(&ConfigOverrides {
        lang: run_args.lang.clone(),
        dpi: run_args.dpi,
        psm: run_args.psm,
        oem: run_args.oem,
        ..Default::default()
    }))
}

/// Rejects inputs the config forbids. Missing paths are reported by the orchestrator.
pub fn validate_input(cfg: &Config, input: &Path) -> Result<()> {
    let input_str = input.display().to_string();

    if cfg.security.reject_url_inputs && looks_like_url(&input_str) {
        return Err(anyhow!("URL inputs are disabled: {input_str}"));
    }

    Ok(())
}

fn resolve_log_path(cfg: &Config, out_dir: Option<&Path>) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    Some(out_dir.unwrap_or_else(|| Path::new(".")).join("tess-batch.log"))
}
