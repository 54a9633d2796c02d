#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use scom_speechlib::WordCode;

/// Lengths of the three clips in the DemoAudioLib reference container,
/// recovered from its index and first-free offset.
pub const DEMO_CLIPS: &[(WordCode, usize)] = &[(4000, 1_039_619), (4001, 24_003), (4002, 24_003)];

pub fn fixture_path(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    for part in parts {
        p.push(part);
    }
    p
}

/// Deterministic stand-in audio.
pub fn clip(word_code: WordCode, len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u32).wrapping_mul(31).wrapping_add(word_code) as u8)
        .collect()
}

pub fn write_clips(dir: &Path, clips: &[(WordCode, usize)]) {
    for &(word_code, len) in clips {
        let path = dir.join(format!("{}.raw", word_code));
        fs::write(&path, clip(word_code, len))
            .unwrap_or_else(|e| panic!("failed to write {}: {}", path.display(), e));
    }
}
