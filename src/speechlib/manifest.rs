//! JSON side-files describing a container's layout and contents.
//!
//! Two files accompany a reference container:
//! - `<name>.offsets.json`: `{"<word code>": <offset>, ...}`
//! - `<name>.md5sums.json`: `{"<word code>": "<md5 hex>", ...}`
//!
//! They let a container be checked entry by entry without shipping the clips.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use md5::{Digest, Md5};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::library::SpeechLib;
use super::types::error::{Result, SpeechLibError};
use super::types::models::WordCode;

/// Hex MD5 of `data`, the digest used in `.md5sums.json` files.
pub fn content_digest(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

/// Expected offsets and digests keyed by word code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub offsets: BTreeMap<WordCode, u32>,
    pub md5sums: BTreeMap<WordCode, String>,
}

/// One disagreement between a manifest and a library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    Offset {
        word_code: WordCode,
        expected: Option<u32>,
        found: Option<u32>,
    },
    Digest {
        word_code: WordCode,
        expected: Option<String>,
        found: Option<String>,
    },
}

impl Manifest {
    /// Records the offset and digest of every entry in `lib`.
    pub fn from_library(lib: &SpeechLib) -> Self {
        let offsets = lib.index.offsets().clone();
        let md5sums = lib
            .audio_data
            .entries
            .iter()
            .map(|(&word_code, entry)| (word_code, content_digest(&entry.data)))
            .collect();
        Self { offsets, md5sums }
    }

    /// Loads `<prefix>.offsets.json` and `<prefix>.md5sums.json`.
    pub fn read(prefix: impl AsRef<Path>) -> Result<Self> {
        let (offsets_path, md5sums_path) = side_file_paths(prefix.as_ref());
        Ok(Self {
            offsets: read_offsets_json(offsets_path)?,
            md5sums: read_md5sums_json(md5sums_path)?,
        })
    }

    /// Writes `<prefix>.offsets.json` and `<prefix>.md5sums.json`.
    pub fn write(&self, prefix: impl AsRef<Path>) -> Result<()> {
        let (offsets_path, md5sums_path) = side_file_paths(prefix.as_ref());
        self.write_offsets_json(offsets_path)?;
        self.write_md5sums_json(md5sums_path)
    }

    pub fn write_offsets_json(&self, path: impl AsRef<Path>) -> Result<()> {
        write_json(path.as_ref(), &self.offsets)
    }

    pub fn write_md5sums_json(&self, path: impl AsRef<Path>) -> Result<()> {
        write_json(path.as_ref(), &self.md5sums)
    }

    /// Compares `lib` against the manifest; an empty result means it matches.
    pub fn verify(&self, lib: &SpeechLib) -> Vec<Mismatch> {
        let actual = Self::from_library(lib);
        let mut mismatches = Vec::new();

        for word_code in union_keys(&self.offsets, &actual.offsets) {
            let expected = self.offsets.get(&word_code).copied();
            let found = actual.offsets.get(&word_code).copied();
            if expected != found {
                mismatches.push(Mismatch::Offset {
                    word_code,
                    expected,
                    found,
                });
            }
        }
        for word_code in union_keys(&self.md5sums, &actual.md5sums) {
            let expected = self.md5sums.get(&word_code).cloned();
            let found = actual.md5sums.get(&word_code).cloned();
            if expected != found {
                mismatches.push(Mismatch::Digest {
                    word_code,
                    expected,
                    found,
                });
            }
        }

        debug!("Manifest check: {} mismatches", mismatches.len());
        mismatches
    }
}

pub fn read_offsets_json(path: impl AsRef<Path>) -> Result<BTreeMap<WordCode, u32>> {
    read_json(path.as_ref())
}

pub fn read_md5sums_json(path: impl AsRef<Path>) -> Result<BTreeMap<WordCode, String>> {
    read_json(path.as_ref())
}

/// `<prefix>.offsets.json` and `<prefix>.md5sums.json`.
pub fn side_file_paths(prefix: &Path) -> (PathBuf, PathBuf) {
    let with_suffix = |suffix: &str| {
        let mut name = prefix.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    };
    (with_suffix(".offsets.json"), with_suffix(".md5sums.json"))
}

fn union_keys<A, B>(a: &BTreeMap<WordCode, A>, b: &BTreeMap<WordCode, B>) -> Vec<WordCode> {
    let mut keys: Vec<WordCode> = a.keys().chain(b.keys()).copied().collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read(path)?;
    serde_json::from_slice(&data).map_err(|e| {
        SpeechLibError::Format(format!("{} is not a valid side-file: {}", path.display(), e))
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut data = serde_json::to_vec_pretty(value).map_err(|e| {
        SpeechLibError::Format(format!("cannot serialise {}: {}", path.display(), e))
    })?;
    data.push(b'\n');
    fs::write(path, data)?;
    info!("Wrote {}", path.display());
    Ok(())
}
