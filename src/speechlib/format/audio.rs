//! Audio payload region.
//!
//! Entries carry no length of their own. Sorted by index offset, each entry
//! runs up to the next entry's offset and the last one up to the header's
//! first-free offset:
//!
//! ```text
//!   off(a)          off(b)     off(c)              first_free
//!   ├───── a ───────┼──── b ───┼──────── c ─────────┤
//! ```
//!
//! A damaged index therefore shifts entry boundaries instead of failing;
//! the container format offers nothing better to check against.

use std::collections::BTreeMap;

use log::{debug, trace};

use crate::speechlib::format::index::IndexTable;
use crate::speechlib::types::error::{Result, SpeechLibError, Violation};
use crate::speechlib::types::models::{Entry, WordCode};
use crate::speechlib::utils;

/// Audio entries keyed by word code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioStore {
    pub entries: BTreeMap<WordCode, Entry>,
}

/// Result of laying entries out contiguously.
#[derive(Debug)]
pub struct EncodedAudio {
    /// Concatenated payloads, starting at the base offset.
    pub bytes: Vec<u8>,
    /// Start offset assigned to each word code.
    pub offsets: BTreeMap<WordCode, u32>,
    /// Offset one past the last written byte.
    pub first_free: u32,
}

impl AudioStore {
    pub fn new(entries: BTreeMap<WordCode, Entry>) -> Self {
        Self { entries }
    }

    /// Slices every indexed entry out of `buf`.
    pub fn decode(buf: &[u8], index: &IndexTable, first_free: u32) -> Result<Self> {
        let pairs = index.by_offset();

        for window in pairs.windows(2) {
            let (first, offset) = window[0];
            let (second, next_offset) = window[1];
            if offset == next_offset {
                return Err(SpeechLibError::Integrity(Violation::DuplicateOffset {
                    first,
                    second,
                    offset,
                }));
            }
        }

        if let Some(&(word_code, offset)) = pairs.last() {
            if offset > first_free {
                return Err(SpeechLibError::Integrity(Violation::OffsetPastFirstFree {
                    word_code,
                    offset,
                    first_free,
                }));
            }
        }
        utils::require_len(buf, first_free as u64, "audio data")?;

        let mut entries = BTreeMap::new();
        for (i, &(word_code, start)) in pairs.iter().enumerate() {
            let end = pairs.get(i + 1).map(|&(_, next)| next).unwrap_or(first_free);
            trace!("Entry {}: [{}..{}) {} bytes", word_code, start, end, end - start);
            entries.insert(word_code, Entry::new(&buf[start as usize..end as usize]));
        }

        debug!("Audio store: {} entries up to offset {}", entries.len(), first_free);
        Ok(Self { entries })
    }

    /// Lays out all entries in ascending word code order from `base`.
    pub fn encode(&self, base: u32) -> Result<EncodedAudio> {
        self.encode_in_order(self.entries.keys().copied(), base)
    }

    /// Lays out entries in the given order from `base`.
    ///
    /// Every word code in `order` must have an entry.
    pub fn encode_in_order(
        &self,
        order: impl IntoIterator<Item = WordCode>,
        base: u32,
    ) -> Result<EncodedAudio> {
        let mut bytes = Vec::with_capacity(self.total_len());
        let mut offsets = BTreeMap::new();
        let mut cursor = base as u64;

        for word_code in order {
            let entry = self
                .entries
                .get(&word_code)
                .ok_or(SpeechLibError::Validation(Violation::MissingEntry(word_code)))?;
            let start = utils::to_offset(cursor).map_err(SpeechLibError::Validation)?;
            offsets.insert(word_code, start);
            bytes.extend_from_slice(&entry.data);
            cursor += entry.len() as u64;
        }

        let first_free = utils::to_offset(cursor).map_err(SpeechLibError::Validation)?;
        Ok(EncodedAudio {
            bytes,
            offsets,
            first_free,
        })
    }

    pub fn get(&self, word_code: WordCode) -> Option<&Entry> {
        self.entries.get(&word_code)
    }

    pub fn contains(&self, word_code: WordCode) -> bool {
        self.entries.contains_key(&word_code)
    }

    pub fn keys(&self) -> impl Iterator<Item = WordCode> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all payload lengths.
    pub fn total_len(&self) -> usize {
        self.entries.values().map(Entry::len).sum()
    }
}
