//! Speech library container access.
//!
//! Decoding runs header → image header → index → audio data, then checks the
//! cross-invariants; encoding walks the same regions in the same order.

pub mod format;
pub mod library;
pub mod manifest;
pub mod source;
pub mod types;
mod utils;

pub use library::{BuildOptions, DecodeOptions, SpeechLib};
pub use types::error::{Result, SpeechLibError, Violation};
