use super::*;

fn sample(key: &str, source: &str) -> Sample {
    Sample {
        key: SampleKey::from(key),
        label: key.to_uppercase(),
        source: source.to_string(),
    }
}

#[test]
fn builtin_library_defaults_to_hello() {
    let library = SampleLibrary::builtin();
    assert_eq!(library.len(), 4);
    assert_eq!(library.default_sample().key, SampleKey::from("hello"));
    assert!(library
        .default_sample()
        .source
        .contains("Hello from the sandbox!"));
    let keys: Vec<_> = library.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys, ["hello", "dice", "error", "bubble"]);
}

#[test]
fn bubble_sample_keeps_escaped_newlines_literal() {
    let library = SampleLibrary::builtin();
    let bubble = library.get(&SampleKey::from("bubble")).expect("bubble");
    assert!(bubble.source.contains(r"succeeded: {val}\n`"));
}

#[test]
fn rejects_empty_and_duplicate_tables() {
    assert!(matches!(
        SampleLibrary::new(Vec::new()),
        Err(SampleLibraryError::Empty)
    ));
    assert!(matches!(
        SampleLibrary::new(vec![sample("", "x")]),
        Err(SampleLibraryError::EmptyKey)
    ));
    let err = SampleLibrary::new(vec![sample("a", "x"), sample("a", "y")])
        .expect_err("duplicate");
    assert!(matches!(err, SampleLibraryError::DuplicateKey(key) if key.as_str() == "a"));
}

#[test]
fn parses_toml_table_in_declared_order() {
    let raw = r#"
[[sample]]
key = "greet"
label = "Greeting"
source = "fn main() {}"

[[sample]]
key = "loop"
label = "Loop"
source = '''
fn main() {
    for i in 0..3 {}
};
'''
"#;
    let library = SampleLibrary::from_toml_str(raw).expect("parse");
    assert_eq!(library.default_sample().label, "Greeting");
    assert!(library
        .get(&SampleKey::from("loop"))
        .expect("loop")
        .source
        .starts_with("fn main() {\n"));
    assert!(library.get(&SampleKey::from("hello")).is_none());
}

#[test]
fn empty_toml_table_is_rejected() {
    assert!(matches!(
        SampleLibrary::from_toml_str(""),
        Err(SampleLibraryError::Empty)
    ));
    assert!(matches!(
        SampleLibrary::from_toml_str("[[sample]]\nkey = 1"),
        Err(SampleLibraryError::Parse(_))
    ));
}

#[test]
fn load_reports_missing_file_path() {
    let path = std::env::temp_dir().join("docsite-missing-samples.toml");
    let err = SampleLibrary::load(&path).expect_err("missing");
    assert!(err.to_string().contains("docsite-missing-samples.toml"));
}
