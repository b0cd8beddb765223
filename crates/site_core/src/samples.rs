use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use shared::domain::SampleKey;
use thiserror::Error;

const HELLO_SOURCE: &str = r#".needs <std>
// Basic hello world that proves the plumbing works.
import {print} from "String" under str;

fn main() -> int {
    str.print("Hello from the sandbox!");
    return 0;
};"#;

const DICE_SOURCE: &str = r#".needs <std>
// Use the math Random helper to roll a six-sided die.
import Random from "math";
import {print} from "String" under str;

fn main() -> int {
    Random rng = new Random();
    const int roll = rng.nextInt(6) + 1;
    str.print(`You rolled a {roll}!`);
    return 0;
};"#;

const PANIC_SOURCE: &str = r#".needs <std>
// Demonstrates how a panic surfaces as a sandbox failure.
import {print} from "String" under str;

fn main() -> int {
    str.print("About to panic...");
    panic("boom");
};"#;

const BUBBLE_SOURCE: &str = r#".needs <std>
// Bubble operator sample: devide() returns Error which short-circuits callers.

import { openFile, createFile } from "files" under fs;
import result from "Utils/result";
import {accept, reject, resultWrapper} from "Utils/result" under res;
import {print} from "String" under str;
import string from "String";
import Error from "Utils/Error";

fn devide(int a, int b) -> int! {
    if b == 0 return new Error("Cannot Devide by 0");
    return a / b;
};

fn ratioOfParts(int total, int partitions, int chunks) -> int! {
    let perPartition = devide(total, partitions)!;

    let perChunk = devide(perPartition, chunks)!;
    return perChunk;
};

fn showCase(int total, int partitions, int chunks, string label) {
    match ratioOfParts(total, partitions, chunks) {
        Ok(val) => str.print(`{label} succeeded: {val}\n`),
        Err(e) => str.print(`{label} failed: {e}\n`)
    };
};

fn main() {
    // This run hits the divide-by-zero Error and bubbles it to showCase.
    showCase(10, 0, 2, "Zero partitions");
    // This run succeeds and proves the happy-path output.
    showCase(10, 5, 2, "Even split");
};"#;

const BUILTIN: [(&str, &str, &str); 4] = [
    ("hello", "Hello world", HELLO_SOURCE),
    ("dice", "Dice roll", DICE_SOURCE),
    ("error", "Panic", PANIC_SOURCE),
    ("bubble", "Bubble operator", BUBBLE_SOURCE),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub key: SampleKey,
    pub label: String,
    pub source: String,
}

#[derive(Debug, Error)]
pub enum SampleLibraryError {
    #[error("sample library must contain at least one sample")]
    Empty,
    #[error("sample key must not be empty")]
    EmptyKey,
    #[error("duplicate sample key: {0}")]
    DuplicateKey(SampleKey),
    #[error("failed to read sample library {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse sample library: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Deserialize)]
struct SampleTable {
    #[serde(rename = "sample", default)]
    samples: Vec<Sample>,
}

/// Read-only table of starter programs. The first entry is the default that
/// reset loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleLibrary {
    samples: Vec<Sample>,
}

impl SampleLibrary {
    pub fn new(samples: Vec<Sample>) -> Result<Self, SampleLibraryError> {
        if samples.is_empty() {
            return Err(SampleLibraryError::Empty);
        }
        let mut seen = HashSet::new();
        for sample in &samples {
            if sample.key.is_empty() {
                return Err(SampleLibraryError::EmptyKey);
            }
            if !seen.insert(&sample.key) {
                return Err(SampleLibraryError::DuplicateKey(sample.key.clone()));
            }
        }
        Ok(Self { samples })
    }

    /// The samples shipped with the site.
    pub fn builtin() -> Self {
        Self {
            samples: BUILTIN
                .iter()
                .map(|(key, label, source)| Sample {
                    key: SampleKey::from(*key),
                    label: (*label).to_string(),
                    source: (*source).to_string(),
                })
                .collect(),
        }
    }

    /// Parse a `[[sample]]` table with `key`, `label` and `source` fields.
    pub fn from_toml_str(raw: &str) -> Result<Self, SampleLibraryError> {
        let table: SampleTable = toml::from_str(raw)?;
        Self::new(table.samples)
    }

    pub fn load(path: &Path) -> Result<Self, SampleLibraryError> {
        let raw = fs::read_to_string(path).map_err(|source| SampleLibraryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn default_sample(&self) -> &Sample {
        // non-empty by construction
        &self.samples[0]
    }

    pub fn get(&self, key: &SampleKey) -> Option<&Sample> {
        self.samples.iter().find(|sample| &sample.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Default for SampleLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[path = "tests/samples_tests.rs"]
mod tests;
