//! Image header decoding and encoding.
//!
//! ```text
//! [+0x00] 4 bytes  index size in bytes (little-endian u32)
//! [+0x04] 4 bytes  highest word code
//! [+0x08] 4 bytes  first-free offset, repeated from the file header
//! [+0x0C]          reserved, zero up to +0x100
//! ```
//!
//! No cross-checks happen here; the library compares both first-free copies.

use byteorder::{ByteOrder, LittleEndian};
use log::debug;

use crate::speechlib::types::error::Result;
use crate::speechlib::types::models::{IMAGE_HEADER_SIZE, ImageHeader};
use crate::speechlib::utils;

pub fn decode(buf: &[u8], offset: usize) -> Result<ImageHeader> {
    utils::require_len(buf, (offset + IMAGE_HEADER_SIZE) as u64, "image header")?;
    let block = &buf[offset..offset + IMAGE_HEADER_SIZE];

    let image = ImageHeader {
        index_size: LittleEndian::read_u32(&block[0x00..]),
        max_word: LittleEndian::read_u32(&block[0x04..]),
        first_free: LittleEndian::read_u32(&block[0x08..]),
    };
    debug!(
        "Image header: index_size={:#x}, max_word={}, first_free={}",
        image.index_size, image.max_word, image.first_free
    );
    Ok(image)
}

pub fn encode(image: &ImageHeader) -> Vec<u8> {
    let mut block = vec![0u8; IMAGE_HEADER_SIZE];
    LittleEndian::write_u32(&mut block[0x00..], image.index_size);
    LittleEndian::write_u32(&mut block[0x04..], image.max_word);
    LittleEndian::write_u32(&mut block[0x08..], image.first_free);
    block
}
