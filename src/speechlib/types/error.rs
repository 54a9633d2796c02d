//! Custom error types for the scom-speechlib crate.

use thiserror::Error;

use super::models::WordCode;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum SpeechLibError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The buffer is truncated or a field cannot be interpreted.
    #[error("Invalid format: {0}")]
    Format(String),

    /// A cross-check failed while decoding a container.
    #[error("Integrity check failed: {0}")]
    Integrity(Violation),

    /// The in-memory library is inconsistent and cannot be encoded.
    #[error("Validation failed: {0}")]
    Validation(Violation),

    /// Directory construction found nothing to build from.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// A broken container invariant.
///
/// The same conditions are checked on decode and on encode; the caller sees
/// them wrapped in [`SpeechLibError::Integrity`] or
/// [`SpeechLibError::Validation`] respectively.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("first-free offsets disagree: header={header}, image header={image}")]
    FirstFreeMismatch { header: u32, image: u32 },

    #[error("word code {0} is in the index but has no audio entry")]
    MissingEntry(WordCode),

    #[error("word code {0} has an audio entry but no index slot")]
    MissingIndexSlot(WordCode),

    #[error("max word mismatch: image header declares {declared}, index holds {actual}")]
    MaxWordMismatch { declared: u32, actual: u32 },

    #[error("word codes {first} and {second} share offset {offset}")]
    DuplicateOffset {
        first: WordCode,
        second: WordCode,
        offset: u32,
    },

    #[error("entry {word_code} starts at {offset}, before the audio region at {data_start}")]
    OffsetBeforeData {
        word_code: WordCode,
        offset: u32,
        data_start: u64,
    },

    #[error("entry {word_code} starts at {offset}, past first-free {first_free}")]
    OffsetPastFirstFree {
        word_code: WordCode,
        offset: u32,
        first_free: u32,
    },

    #[error("entry {word_code} should end at {expected} but ends at {found}")]
    NotContiguous {
        word_code: WordCode,
        expected: u64,
        found: u64,
    },

    #[error("index table is {table} bytes but the image header declares {declared}")]
    IndexSizeMismatch { declared: u32, table: u32 },

    #[error("first-free {first_free} lies inside the index region ending at {data_start}")]
    FirstFreeBeforeData { first_free: u32, data_start: u64 },

    #[error("word code {word_code} does not fit an index of {capacity} slots")]
    WordCodeOutOfRange { word_code: WordCode, capacity: u32 },

    #[error("index size {0} is not a multiple of the slot width")]
    MisalignedIndexSize(u32),

    #[error("{field} is {len} bytes, field holds {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("audio region ends at {0}, beyond the 32-bit offset range")]
    OffsetOverflow(u64),
}

/// A convenience `Result` type alias using the crate's `SpeechLibError` type.
pub type Result<T> = std::result::Result<T, SpeechLibError>;
