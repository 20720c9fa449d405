use clap::Parser;
use tess_batch::{
    cli::{effective_ocr_config, validate_input, Args, Command, RunArgs},
    config::Config,
};

#[test]
fn run_flags_parse() {
    let args = Args::try_parse_from([
        "tess-batch", "--log-level", "debug", "run", "--input", "scans", "--recursive",
        "--combine", "--ext", "png", "--ext", "pdf", "--psm", "6",
    ])
    .unwrap();

    assert_eq!(args.log_level.as_deref(), Some("debug"));
    let Command::Run(run) = args.cmd else {
        panic!("expected run");
    };
    assert!(run.recursive && run.combine && !run.print_text);
    assert_eq!(run.extensions, vec!["png", "pdf"]);
    assert_eq!(run.psm, Some(6));
}

#[test]
fn flag_overrides_apply_on_top_of_config() {
    let mut cfg = Config::default();
    cfg.ocr.lang = "jpn".into();
    cfg.ocr.formats.pdf = true;
    let run = RunArgs {
        oem: Some(1),
        ..Default::default()
    };

    let ocr = effective_ocr_config(&cfg, &run).unwrap();

    assert_eq!(ocr.lang, "jpn");
    assert_eq!(ocr.oem, 1);
    assert!(ocr.formats.pdf);
    assert_eq!(cfg.ocr.oem, 3);
}

#[test]
fn ocr_args_replace_the_config_section() {
    let mut cfg = Config::default();
    cfg.ocr.lang = "jpn".into();
    let run = RunArgs {
        ocr_args: Some("-l eng+deu --psm 4".into()),
        lang: Some("fra".into()),
        ..Default::default()
    };

    let ocr = effective_ocr_config(&cfg, &run).unwrap();

    assert_eq!(ocr.lang, "fra");
    assert_eq!(ocr.psm, 4);
}

#[test]
fn bad_ocr_args_are_reported() {
    let run = RunArgs {
        ocr_args: Some("--oem x".into()),
        ..Default::default()
    };
    assert!(effective_ocr_config(&Config::default(), &run).is_err());
}

#[test]
fn missing_inputs_surface_the_typed_not_found_error() {
    let tmp = tempfile::tempdir().unwrap();
    let missing = tmp.path().join("absent.png");
    let cfg = Config::default();

    validate_input(&cfg, &missing).unwrap();
    assert!(validate_input(&cfg, std::path::Path::new("https://example.com/a.png")).is_err());

    let err = anyhow::Error::from(tess_batch::probe::probe_path(&missing, true).unwrap_err())
        .context(format!("processing {}", missing.display()));
    let shown = format!("{err:#}");
    assert!(shown.contains("input not found"), "{shown}");
    assert!(shown.contains("absent.png"));
}
