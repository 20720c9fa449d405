use tess_batch::{
    config::Postprocess,
    postprocess::{join_pages, TextCleaner},
    OcrError,
};

#[test]
fn strips_form_feeds_and_trailing_whitespace() {
    let cleaner = TextCleaner::new(&Postprocess::default()).unwrap();
    let cleaned = cleaner.clean("第一行  \r\nsecond line\t\n\n\u{000C}");
    assert_eq!(cleaned, "第一行\nsecond line");
}

#[test]
fn unicode_normalization_is_opt_in() {
    let raw = "ｶﾀｶﾅ ＡＢＣ";
    let default = TextCleaner::new(&Postprocess::default()).unwrap();
    assert_eq!(default.clean(raw), raw);

    let mut cfg = Postprocess::default();
    cfg.normalize_unicode = true;
    let nfkc = TextCleaner::new(&cfg).unwrap();
    assert_eq!(nfkc.clean(raw), "カタカナ ABC");
}

#[test]
fn removes_lines_matching_patterns() {
    let mut cfg = Postprocess::default();
    cfg.remove_by_regex = true;
    cfg.regex.patterns = vec![r"^(page\s+\d+|\d+\s*/\s*\d+)$".into()];
    let cleaner = TextCleaner::new(&cfg).unwrap();

    let cleaned = cleaner.clean("Header\npage 3\nbody text\n 4 / 10 \n");

    assert_eq!(cleaned, "Header\nbody text");
}

#[test]
fn bad_pattern_is_a_config_error() {
    let mut cfg = Postprocess::default();
    cfg.remove_by_regex = true;
    cfg.regex.patterns = vec!["(unclosed".into()];
    assert!(matches!(TextCleaner::new(&cfg), Err(OcrError::InvalidConfig(_))));
}

#[test]
fn pages_join_with_separator_only_between_parts() {
    assert_eq!(join_pages(["a", "b", "c"], "\n---\n"), "a\n---\nb\n---\nc");
    assert_eq!(join_pages(Vec::<String>::new(), "\n\n"), "");
}
