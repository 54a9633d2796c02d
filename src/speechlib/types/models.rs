//! Core data structures for speech library components.
//!
//! This module defines the records decoded from a container:
//! - The file header and the image header that repeats its first-free offset
//! - Audio entries addressed by word code
//! - The fixed sizes and positions of every region

use std::fmt;

use chrono::NaiveDateTime;

use crate::speechlib::utils;

/// Integer identifier of a speech clip; also its slot position in the index.
pub type WordCode = u32;

/// Size of the leading file header block.
pub const HEADER_SIZE: usize = 0x100;
/// Position of the image header block.
pub const IMAGE_HEADER_OFFSET: usize = HEADER_SIZE;
/// Size of the image header block.
pub const IMAGE_HEADER_SIZE: usize = 0x100;
/// Position of the first index slot.
pub const INDEX_OFFSET: usize = IMAGE_HEADER_OFFSET + IMAGE_HEADER_SIZE;
/// Width of one index slot (little-endian u32 offset).
pub const SLOT_WIDTH: usize = 4;
/// Index regions are sized in multiples of this many bytes.
pub const INDEX_GRANULARITY: usize = 0x100;

pub const NAME_LEN: usize = 32;
pub const VERSION_LEN: usize = 16;
pub const TIMESTAMP_LEN: usize = 32;

/// `fileType` written by producers unless overridden.
pub const DEFAULT_FILE_TYPE: u8 = 1;

/// Device-native timestamp layout, e.g. `09/09/09 12:00`.
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%y %H:%M";

/// Parsed file header.
///
/// Text fields hold the raw bytes found before the NUL padding. `timestamp`
/// is derived from `timestamp_raw` and stays `None` when the string is not a
/// recognised date; the raw bytes are always what gets written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// One past the last used audio byte.
    pub first_free: u32,
    pub name: Vec<u8>,
    pub version: Vec<u8>,
    pub timestamp_raw: Vec<u8>,
    pub timestamp: Option<NaiveDateTime>,
    pub file_type: u8,
}

impl Header {
    /// Replaces the raw timestamp string and re-derives the parsed value.
    pub fn set_timestamp_raw(&mut self, raw: impl Into<Vec<u8>>) {
        self.timestamp_raw = raw.into();
        self.timestamp = utils::parse_timestamp(&self.timestamp_raw);
    }

    /// Stores `timestamp` in the device-native text form.
    ///
    /// The device format has minute resolution, so seconds are dropped.
    pub fn set_timestamp(&mut self, timestamp: NaiveDateTime) {
        self.set_timestamp_raw(timestamp.format(TIMESTAMP_FORMAT).to_string());
    }

    pub fn name_lossy(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }

    pub fn version_lossy(&self) -> String {
        String::from_utf8_lossy(&self.version).into_owned()
    }

    pub fn timestamp_lossy(&self) -> String {
        String::from_utf8_lossy(&self.timestamp_raw).into_owned()
    }
}

impl Default for Header {
    fn default() -> Self {
        Self {
            first_free: 0,
            name: Vec::new(),
            version: Vec::new(),
            timestamp_raw: Vec::new(),
            timestamp: None,
            file_type: DEFAULT_FILE_TYPE,
        }
    }
}

/// Secondary header following the file header.
///
/// `first_free` duplicates [`Header::first_free`]; the two copies are kept as
/// independent fields and compared when a library is validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageHeader {
    /// Byte length of the index table.
    pub index_size: u32,
    /// Highest word code present in the index.
    pub max_word: u32,
    pub first_free: u32,
}

impl ImageHeader {
    /// Number of index slots described by `index_size`.
    pub fn capacity(&self) -> u32 {
        self.index_size / SLOT_WIDTH as u32
    }

    /// Absolute offset of the first byte after the index table.
    pub fn data_start(&self) -> u64 {
        INDEX_OFFSET as u64 + self.index_size as u64
    }
}

/// One audio clip.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub data: Vec<u8>,
}

impl Entry {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// Clips run to megabytes; print the size rather than the samples.
impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry").field("len", &self.data.len()).finish()
    }
}
