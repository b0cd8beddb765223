use super::*;

use std::{
    collections::HashMap,
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_config(name: &str, contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("docsite_config_test_{name}_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("docsite.toml");
    fs::write(&path, contents).expect("write config");
    path
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn missing_file_yields_defaults() {
    let path = env::temp_dir().join("docsite_config_test_absent/docsite.toml");
    assert_eq!(load_settings_with(&path, no_env), Settings::default());
}

#[test]
fn file_values_override_defaults() {
    let path = temp_config(
        "file",
        r#"
site_url = "https://lang.example.org/"
examples_path = "/docs/examples"
request_timeout_seconds = "5"
samples_file = "samples.toml"
"#,
    );

    let settings = load_settings_with(&path, no_env);
    assert_eq!(settings.site_url, "https://lang.example.org/");
    assert_eq!(settings.examples_path, "/docs/examples");
    assert_eq!(settings.request_timeout(), Duration::from_secs(5));
    assert_eq!(settings.samples_file, Some(PathBuf::from("samples.toml")));
    assert_eq!(settings.language_name, "AFlat");

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn environment_overrides_file() {
    let path = temp_config("env", "site_url = \"http://from-file\"\n");
    let vars: HashMap<&str, &str> = [
        ("APP__SITE_URL", "http://from-env"),
        ("APP__LANGUAGE_NAME", "Quill"),
        ("APP__REQUEST_TIMEOUT_SECONDS", "12"),
    ]
    .into_iter()
    .collect();

    let settings = load_settings_with(&path, |key| vars.get(key).map(|v| v.to_string()));
    assert_eq!(settings.site_url, "http://from-env");
    assert_eq!(settings.language_name, "Quill");
    assert_eq!(settings.request_timeout_seconds, 12);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn app_prefixed_site_url_wins_over_short_form() {
    let path = env::temp_dir().join("docsite_config_test_absent/docsite.toml");
    let settings = load_settings_with(&path, |key| match key {
        "DOCSITE_SITE_URL" => Some("http://short".to_string()),
        "APP__SITE_URL" => Some("http://prefixed".to_string()),
        _ => None,
    });
    assert_eq!(settings.site_url, "http://prefixed");
}

#[test]
fn invalid_values_are_ignored() {
    let path = temp_config("invalid", "request_timeout_seconds = \"soon\"\n");
    let settings = load_settings_with(&path, |key| {
        (key == "APP__REQUEST_TIMEOUT_SECONDS").then(|| "0".to_string())
    });
    assert_eq!(settings.request_timeout_seconds, 30);
    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn unparsable_file_falls_back_to_defaults() {
    let path = temp_config("garbage", "site_url = [1, 2]\n");
    assert_eq!(load_settings_with(&path, no_env), Settings::default());
    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}
