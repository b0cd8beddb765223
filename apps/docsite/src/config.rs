use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "docsite.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub site_url: String,
    pub examples_path: String,
    pub request_timeout_seconds: u64,
    pub samples_file: Option<PathBuf>,
    pub language_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_url: "http://127.0.0.1:8080".into(),
            examples_path: "/examples".into(),
            request_timeout_seconds: 30,
            samples_file: None,
            language_name: "AFlat".into(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    fn set(&mut self, key: &str, value: String) {
        match key {
            "site_url" => self.site_url = value,
            "examples_path" => self.examples_path = value,
            "request_timeout_seconds" => match value.parse::<u64>() {
                Ok(seconds) if seconds > 0 => self.request_timeout_seconds = seconds,
                _ => warn!("config: ignoring invalid request_timeout_seconds={value}"),
            },
            "samples_file" => self.samples_file = Some(PathBuf::from(value)),
            "language_name" => self.language_name = value,
            _ => {}
        }
    }
}

const KEYS: [&str; 5] = [
    "site_url",
    "examples_path",
    "request_timeout_seconds",
    "samples_file",
    "language_name",
];

/// Defaults, then the flat `key = "value"` file at `path`, then `APP__*` environment overrides.
pub fn load_settings(path: &Path) -> Settings {
    load_settings_with(path, |key| std::env::var(key).ok())
}

pub fn load_settings_with(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => {
                for key in KEYS {
                    if let Some(v) = file_cfg.get(key) {
                        settings.set(key, v.clone());
                    }
                }
            }
            Err(err) => warn!("config: ignoring unparsable file={} error={err}", path.display()),
        },
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => warn!("config: cannot read file={} error={err}", path.display()),
    }

    if let Some(v) = env("DOCSITE_SITE_URL") {
        settings.site_url = v;
    }
    for key in KEYS {
        if let Some(v) = env(&format!("APP__{}", key.to_ascii_uppercase())) {
            settings.set(key, v);
        }
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
