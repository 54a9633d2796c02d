//! Binary codec layer for speech library containers.
//!
//! # Module Organization
//!
//! - [`header`]: The fixed file header (name, version, timestamp, first-free)
//! - [`image_header`]: The secondary header repeating the first-free offset
//! - [`index`]: The word code to offset table
//! - [`audio`]: Entry boundaries and payload bytes
//!
//! # Architecture
//!
//! ```text
//! File Structure:
//! ┌─────────────────┐ 0x000
//! │  Header         │ ← header::decode()
//! ├─────────────────┤ 0x100
//! │  Image Header   │ ← image_header::decode()
//! ├─────────────────┤ 0x200
//! │  Index Table    │ ← IndexTable::decode()
//! │  (index_size)   │
//! ├─────────────────┤
//! │  Audio Data     │ ← AudioStore::decode()
//! │  (to firstFree) │
//! └─────────────────┘
//! ```

pub mod audio;
pub mod header;
pub mod image_header;
pub mod index;
