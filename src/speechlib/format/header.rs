//! File header decoding and encoding.
//!
//! # Header Structure
//! ```text
//! [0x00]  4 bytes  first-free offset (little-endian u32)
//! [0x04] 32 bytes  library name, NUL padded
//! [0x24] 16 bytes  version string, NUL padded
//! [0x34] 32 bytes  timestamp string, NUL padded
//! [0x54]  1 byte   file type
//! [0x55]           reserved, zero up to 0x100
//! ```

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, warn};

use crate::speechlib::types::error::{Result, SpeechLibError};
use crate::speechlib::types::models::{
    HEADER_SIZE, Header, NAME_LEN, TIMESTAMP_LEN, VERSION_LEN,
};
use crate::speechlib::utils;

const FIRST_FREE_AT: usize = 0x00;
const NAME_AT: usize = 0x04;
const VERSION_AT: usize = NAME_AT + NAME_LEN;
const TIMESTAMP_AT: usize = VERSION_AT + VERSION_LEN;
const FILE_TYPE_AT: usize = TIMESTAMP_AT + TIMESTAMP_LEN;

/// Decodes the header at the start of `buf`.
///
/// An unparsable timestamp string is kept verbatim with `timestamp = None`.
pub fn decode(buf: &[u8]) -> Result<Header> {
    utils::require_len(buf, HEADER_SIZE as u64, "header")?;

    let first_free = LittleEndian::read_u32(&buf[FIRST_FREE_AT..]);
    let name = utils::read_fixed_field(&buf[NAME_AT..VERSION_AT], "name");
    let version = utils::read_fixed_field(&buf[VERSION_AT..TIMESTAMP_AT], "version");
    let timestamp_raw = utils::read_fixed_field(&buf[TIMESTAMP_AT..FILE_TYPE_AT], "timestamp");
    let file_type = buf[FILE_TYPE_AT];

    let timestamp = utils::parse_timestamp(&timestamp_raw);
    if timestamp.is_none() && !timestamp_raw.is_empty() {
        warn!(
            "Header timestamp {:?} is not in a known format; keeping it raw",
            String::from_utf8_lossy(&timestamp_raw)
        );
    }

    debug!(
        "Header: name={:?}, version={:?}, file_type={}, first_free={}",
        String::from_utf8_lossy(&name),
        String::from_utf8_lossy(&version),
        file_type,
        first_free
    );

    Ok(Header {
        first_free,
        name,
        version,
        timestamp_raw,
        timestamp,
        file_type,
    })
}

/// Encodes `header` into a zero-padded header block.
///
/// `timestamp_raw` is written as stored; the derived timestamp is not consulted.
pub fn encode(header: &Header) -> Result<Vec<u8>> {
    let mut block = vec![0u8; HEADER_SIZE];

    LittleEndian::write_u32(&mut block[FIRST_FREE_AT..], header.first_free);
    utils::write_fixed_field(&mut block[NAME_AT..VERSION_AT], &header.name, "name")
        .map_err(SpeechLibError::Validation)?;
    utils::write_fixed_field(&mut block[VERSION_AT..TIMESTAMP_AT], &header.version, "version")
        .map_err(SpeechLibError::Validation)?;
    utils::write_fixed_field(
        &mut block[TIMESTAMP_AT..FILE_TYPE_AT],
        &header.timestamp_raw,
        "timestamp",
    )
    .map_err(SpeechLibError::Validation)?;
    block[FILE_TYPE_AT] = header.file_type;

    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speechlib::types::models::DEFAULT_FILE_TYPE;
    use chrono::Timelike;

    fn sample() -> Header {
        let mut header = Header {
            first_free: 7741549,
            name: b"SCOM Sp Lib Eng".to_vec(),
            version: b"1.3.0".to_vec(),
            file_type: 2,
            ..Header::default()
        };
        header.set_timestamp_raw(b"2/17/2017".to_vec());
        header
    }

    #[test]
    fn encodes_fields_at_fixed_positions() {
        let block = encode(&sample()).unwrap();
        assert_eq!(block.len(), HEADER_SIZE);
        assert_eq!(&block[0..4], &7741549u32.to_le_bytes());
        assert_eq!(&block[4..19], b"SCOM Sp Lib Eng");
        assert!(block[19..VERSION_AT].iter().all(|&b| b == 0));
        assert_eq!(&block[VERSION_AT..VERSION_AT + 5], b"1.3.0");
        assert_eq!(&block[TIMESTAMP_AT..TIMESTAMP_AT + 9], b"2/17/2017");
        assert_eq!(block[FILE_TYPE_AT], 2);
        assert!(block[FILE_TYPE_AT + 1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn decode_reads_back_encoded_block() {
        let header = sample();
        let decoded = decode(&encode(&header).unwrap()).unwrap();
        assert_eq!(decoded, header);
        assert!(decoded.timestamp.is_some());
    }

    #[test]
    fn keeps_unparsable_timestamp_raw() {
        let mut header = Header::default();
        header.set_timestamp_raw(b"build 42".to_vec());
        let decoded = decode(&encode(&header).unwrap()).unwrap();
        assert_eq!(decoded.timestamp_raw, b"build 42");
        assert_eq!(decoded.timestamp, None);
        assert_eq!(decoded.file_type, DEFAULT_FILE_TYPE);
    }

    #[test]
    fn set_timestamp_writes_device_format() {
        let ts = chrono::NaiveDate::from_ymd_opt(2009, 9, 9)
            .and_then(|d| d.and_hms_opt(12, 0, 45))
            .unwrap();
        let mut header = Header::default();
        header.set_timestamp(ts);
        assert_eq!(header.timestamp_raw, b"09/09/09 12:00");
        assert_eq!(header.timestamp, ts.with_second(0));
    }

    #[test]
    fn short_buffer_is_format_error() {
        let err = decode(&[0u8; HEADER_SIZE - 1]).unwrap_err();
        assert!(matches!(err, SpeechLibError::Format(_)), "got {:?}", err);
    }

    #[test]
    fn overlong_name_is_validation_error() {
        let header = Header {
            name: vec![b'x'; NAME_LEN + 1],
            ..Header::default()
        };
        let err = encode(&header).unwrap_err();
        assert!(matches!(err, SpeechLibError::Validation(_)), "got {:?}", err);
    }
}
