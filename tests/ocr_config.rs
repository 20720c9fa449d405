use tess_batch::{ConfigOverrides, OcrConfig, OcrError, OutputFormats};

#[test]
fn defaults_match_the_engine_defaults() {
    let cfg = OcrConfig::default();
    assert_eq!(cfg.lang, "eng");
    assert_eq!(cfg.psm, 3);
    assert_eq!(cfg.oem, 3);
    assert_eq!(cfg.dpi, 300);
    assert_eq!(cfg.formats, OutputFormats::text_only());
    assert!(cfg.config_string.is_empty());
}

#[test]
fn cmd_args_carry_language_modes_and_extra_flags() {
    let cfg = OcrConfig::default()
        .with_lang("jpn+eng")
        .with_psm(6)
        .with_config_string("-c preserve_interword_spaces=1");

    assert_eq!(
        cfg.to_cmd_args(),
        vec![
            "-l",
            "jpn+eng",
            "--psm",
            "6",
            "--oem",
            "3",
            "-c",
            "preserve_interword_spaces=1"
        ]
    );
}

#[test]
fn tessdata_dir_is_appended_when_set() {
    let mut cfg = OcrConfig::default();
    cfg.tessdata_dir = Some("/opt/tessdata".into());
    let args = cfg.to_cmd_args();
    assert_eq!(&args[args.len() - 2..], ["--tessdata-dir", "/opt/tessdata"]);
}

#[test]
fn cli_string_sets_known_flags_and_keeps_the_rest() {
    let cfg = OcrConfig::from_cli_string(
        "-l jpn+eng --psm 6 --oem 1 --tessdata-dir /td -c tessedit_do_invert=0 pdf",
    )
    .unwrap();

    assert_eq!(cfg.lang, "jpn+eng");
    assert_eq!(cfg.psm, 6);
    assert_eq!(cfg.oem, 1);
    assert_eq!(cfg.tessdata_dir.as_deref(), Some("/td"));
    assert!(cfg.formats.pdf);
    assert!(cfg.formats.text);
    assert_eq!(cfg.config_string, "-c tessedit_do_invert=0");
}

#[test]
fn cli_string_rejects_non_numeric_modes() {
    let err = OcrConfig::from_cli_string("--psm auto").unwrap_err();
    assert!(matches!(err, OcrError::InvalidConfig(_)));
}

#[test]
fn out_of_range_modes_are_left_to_the_engine() {
    let cfg = OcrConfig::from_cli_string("--psm 300 --oem 42").unwrap();
    assert_eq!(cfg.psm, 300);
    assert_eq!(cfg.oem, 42);
    let args = cfg.to_cmd_args();
    assert_eq!(&args[2..6], ["--psm", "300", "--oem", "42"]);
}

#[test]
fn trailing_flag_without_value_is_kept_as_extra() {
    let cfg = OcrConfig::from_cli_string("--psm 7 -l").unwrap();
    assert_eq!(cfg.psm, 7);
    assert_eq!(cfg.lang, "eng");
    assert_eq!(cfg.config_string, "-l");
}

#[test]
fn overrides_produce_a_new_value() {
    let base = OcrConfig::default();
    let ov = ConfigOverrides {
        lang: Some("kor".into()),
        oem: Some(1),
        ..Default::default()
    };

    let derived = base.overridden(&ov);

    assert_eq!(derived.lang, "kor");
    assert_eq!(derived.oem, 1);
    assert_eq!(derived.psm, base.psm);
    assert_eq!(base, OcrConfig::default());
}

#[test]
fn engine_format_names_follow_toggles() {
    let formats = OutputFormats {
        text: true,
        pdf: true,
        hocr: true,
    };
    assert_eq!(formats.engine_names(), vec!["pdf", "hocr", "txt"]);
    assert!(OutputFormats::none().engine_names().is_empty());
}
