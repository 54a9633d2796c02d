//! # scom-speechlib
//!
//! Reader and writer for the speech library containers (`.bin`) loaded into
//! SCOM voice-output controllers.
//!
//! A container holds a fixed header, a direct-indexed table mapping word
//! codes to offsets, and the raw audio clips. Libraries can be decoded from a
//! file, built from a directory of `<word code>.raw` clips, and encoded back
//! byte for byte.
pub mod speechlib;

// Re-export the main types for convenience
pub use speechlib::{
    BuildOptions, DecodeOptions, Result, SpeechLib, SpeechLibError, Violation,
    format::{audio::AudioStore, index::IndexTable},
    manifest::{Manifest, Mismatch},
    types::models::{Entry, Header, ImageHeader, WordCode},
};
