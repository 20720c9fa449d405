use std::ffi::OsString;
use std::path::Path;
use tess_batch::{
    engine::{poppler::page_number, tesseract::{build_args, parse_version}},
    OcrConfig, OutputFormats,
};

#[test]
fn tesseract_args_put_paths_first_and_formats_last() {
    let cfg = OcrConfig::default().with_lang("jpn").with_oem(1);
    let formats = OutputFormats {
        text: true,
        pdf: true,
        hocr: false,
    };

    let args = build_args(Path::new("in/p1.png"), Path::new("out/p1"), &cfg, &formats);

    let expected: Vec<OsString> = [
        "in/p1.png", "out/p1", "-l", "jpn", "--psm", "3", "--oem", "1", "pdf", "txt",
    ]
    .iter()
    .map(OsString::from)
    .collect();
    assert_eq!(args, expected);
}

#[test]
fn version_banner_is_parsed() {
    let banner = "tesseract 5.3.0\n leptonica-1.82.0\n  libgif 5.2.1\n";
    assert_eq!(parse_version(banner).as_deref(), Some("5.3.0"));
    assert_eq!(parse_version("tesseract v4.1.1-rc2\n").as_deref(), Some("4.1.1-rc2"));
    assert_eq!(parse_version("command not found"), None);
}

#[test]
fn pdftoppm_page_files_are_numbered() {
    assert_eq!(page_number(Path::new("/tmp/x/page-07.png")), Some(7));
    assert_eq!(page_number(Path::new("/tmp/x/page-112.png")), Some(112));
    assert_eq!(page_number(Path::new("/tmp/x/page-1.ppm")), None);
    assert_eq!(page_number(Path::new("/tmp/x/cover.png")), None);
}

#[test]
fn missing_tesseract_binary_is_reported_as_such() {
    use tess_batch::engine::{Recognizer, TesseractEngine};

    let engine = TesseractEngine::with_exe("/nonexistent/bin/tesseract");
    let err = engine.version().unwrap_err();
    assert!(matches!(err, tess_batch::OcrError::EngineNotFound(_)));
}

#[test]
fn missing_pdftoppm_is_a_missing_capability() {
    use tess_batch::engine::{PopplerRasterizer, Rasterizer};

    let mut cfg = tess_batch::Config::default();
    cfg.pdf.pdftoppm_cmd = "/nonexistent/bin/pdftoppm".into();
    let rasterizer = PopplerRasterizer::new(&cfg);
    let tmp = tempfile::tempdir().unwrap();

    assert!(!rasterizer.is_available());
    let err = rasterizer
        .rasterize(&tmp.path().join("doc.pdf"), 150, tmp.path())
        .unwrap_err();
    match err {
        tess_batch::OcrError::CapabilityMissing { capability, hint } => {
            assert_eq!(capability, "pdf");
            assert!(hint.contains("pdftoppm"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
