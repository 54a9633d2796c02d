//! Direct-addressed word code index.
//!
//! The table is an array of little-endian u32 offsets. Slot `i` belongs to
//! word code `i`, and a zero slot means the word code is unused:
//!
//! ```text
//! slot:    0      1      2     ...  n-1
//!        ┌──────┬──────┬──────┬─────┬──────┐
//!        │  0   │ off1 │  0   │ ... │ offN │
//!        └──────┴──────┴──────┴─────┴──────┘
//! ```
//!
//! Callers see a map from word code to offset; the slot position is only
//! load-bearing on disk.

use std::collections::BTreeMap;

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, trace};

use crate::speechlib::types::error::{Result, SpeechLibError, Violation};
use crate::speechlib::types::models::{SLOT_WIDTH, WordCode};
use crate::speechlib::utils;

/// Word code to byte offset mapping plus the on-disk table size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexTable {
    size: u32,
    offsets: BTreeMap<WordCode, u32>,
}

impl IndexTable {
    /// Builds a table of `size` bytes holding `offsets`.
    pub fn new(size: u32, offsets: BTreeMap<WordCode, u32>) -> Self {
        Self { size, offsets }
    }

    /// Reads `index_size` bytes of slots starting at `offset`.
    pub fn decode(buf: &[u8], offset: usize, index_size: u32) -> Result<Self> {
        if index_size as usize % SLOT_WIDTH != 0 {
            return Err(SpeechLibError::Format(format!(
                "index size {} is not a multiple of {}",
                index_size, SLOT_WIDTH
            )));
        }
        let end = offset as u64 + index_size as u64;
        utils::require_len(buf, end, "index table")?;

        let region = &buf[offset..end as usize];
        let offsets: BTreeMap<WordCode, u32> = region
            .chunks_exact(SLOT_WIDTH)
            .enumerate()
            .filter_map(|(slot, raw)| {
                let value = LittleEndian::read_u32(raw);
                (value != 0).then_some((slot as WordCode, value))
            })
            .collect();

        debug!(
            "Index table: {} of {} slots occupied",
            offsets.len(),
            index_size as usize / SLOT_WIDTH
        );
        Ok(Self {
            size: index_size,
            offsets,
        })
    }

    /// Writes `capacity_slots` slots; unused word codes become zero.
    ///
    /// A word code that does not fit is an error rather than being dropped.
    pub fn encode(&self, capacity_slots: u32) -> Result<Vec<u8>> {
        if let Some(word_code) = self.offsets.keys().copied().find(|&w| w >= capacity_slots) {
            return Err(SpeechLibError::Validation(Violation::WordCodeOutOfRange {
                word_code,
                capacity: capacity_slots,
            }));
        }

        let mut table = vec![0u8; capacity_slots as usize * SLOT_WIDTH];
        for (&word_code, &offset) in &self.offsets {
            trace!("Slot {} -> {}", word_code, offset);
            let at = word_code as usize * SLOT_WIDTH;
            LittleEndian::write_u32(&mut table[at..at + SLOT_WIDTH], offset);
        }
        Ok(table)
    }

    /// Byte length of the on-disk table.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of slots the table addresses.
    pub fn capacity(&self) -> u32 {
        self.size / SLOT_WIDTH as u32
    }

    pub fn get(&self, word_code: WordCode) -> Option<u32> {
        self.offsets.get(&word_code).copied()
    }

    pub fn contains(&self, word_code: WordCode) -> bool {
        self.offsets.contains_key(&word_code)
    }

    /// Occupied word codes in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = WordCode> + '_ {
        self.offsets.keys().copied()
    }

    pub fn max_key(&self) -> Option<WordCode> {
        self.offsets.keys().next_back().copied()
    }

    /// `(word code, offset)` pairs in ascending word code order.
    pub fn iter(&self) -> impl Iterator<Item = (WordCode, u32)> + '_ {
        self.offsets.iter().map(|(&w, &o)| (w, o))
    }

    /// `(word code, offset)` pairs in ascending offset order.
    pub fn by_offset(&self) -> Vec<(WordCode, u32)> {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_by_key(|&(word_code, offset)| (offset, word_code));
        pairs
    }

    pub fn offsets(&self) -> &BTreeMap<WordCode, u32> {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn insert(&mut self, word_code: WordCode, offset: u32) -> Option<u32> {
        self.offsets.insert(word_code, offset)
    }

    pub fn remove(&mut self, word_code: WordCode) -> Option<u32> {
        self.offsets.remove(&word_code)
    }
}
