//! Low-level helpers shared by the codecs.

use chrono::{NaiveDate, NaiveDateTime};
use log::warn;

use super::types::error::{Result, SpeechLibError, Violation};
use super::types::models::{INDEX_GRANULARITY, SLOT_WIDTH};

/// Layouts seen in device headers, tried in order.
///
/// Two-digit years go first: `%Y` would happily read `09` as year 9.
const DATETIME_FORMATS: &[&str] = &["%m/%d/%y %H:%M", "%m/%d/%Y %H:%M"];
const DATE_FORMATS: &[&str] = &["%m/%d/%y", "%m/%d/%Y"];

/// Fails with a format error unless `buf` holds at least `end` bytes.
pub fn require_len(buf: &[u8], end: u64, context: &str) -> Result<()> {
    if (buf.len() as u64) < end {
        return Err(SpeechLibError::Format(format!(
            "{} needs {} bytes, buffer holds {}",
            context,
            end,
            buf.len()
        )));
    }
    Ok(())
}

/// Extracts a NUL-padded text field.
///
/// Everything from the first NUL on is padding. Non-zero bytes inside the
/// padding cannot be represented and are reported, not kept.
pub fn read_fixed_field(raw: &[u8], field: &str) -> Vec<u8> {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    if raw[end..].iter().any(|&b| b != 0) {
        warn!("{} field has data after its terminator; ignoring it", field);
    }
    raw[..end].to_vec()
}

/// Writes `value` into `out`, padding the rest with NUL.
pub fn write_fixed_field(
    out: &mut [u8],
    value: &[u8],
    field: &'static str,
) -> std::result::Result<(), Violation> {
    if value.len() > out.len() {
        return Err(Violation::FieldTooLong {
            field,
            len: value.len(),
            max: out.len(),
        });
    }
    out[..value.len()].copy_from_slice(value);
    out[value.len()..].fill(0);
    Ok(())
}

/// Best-effort parse of a header timestamp string.
///
/// Returns `None` for anything that is not one of the device layouts,
/// including an empty string.
pub fn parse_timestamp(raw: &[u8]) -> Option<NaiveDateTime> {
    let text = std::str::from_utf8(raw).ok()?.trim();
    if text.is_empty() {
        return None;
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Index region size needed to address word codes `0..=max_word`.
pub fn index_size_for(max_word: u32) -> u64 {
    let slots_bytes = (max_word as u64 + 1) * SLOT_WIDTH as u64;
    slots_bytes.div_ceil(INDEX_GRANULARITY as u64) * INDEX_GRANULARITY as u64
}

/// Narrows a computed offset to the on-disk 32-bit width.
pub fn to_offset(value: u64) -> std::result::Result<u32, Violation> {
    u32::try_from(value).map_err(|_| Violation::OffsetOverflow(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn parses_device_datetime_with_two_digit_year() {
        let ts = parse_timestamp(b"09/09/09 12:00").expect("timestamp");
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2009, 9, 9).unwrap());
        assert_eq!(ts.hour(), 12);
    }

    #[test]
    fn parses_date_only_with_four_digit_year() {
        let ts = parse_timestamp(b"2/17/2017").expect("timestamp");
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2017, 2, 17).unwrap());
        assert_eq!(ts.hour(), 0);
    }

    #[test]
    fn unparsable_timestamp_is_none() {
        assert_eq!(parse_timestamp(b""), None);
        assert_eq!(parse_timestamp(b"yesterday"), None);
        assert_eq!(parse_timestamp(&[0xFF, 0xFE]), None);
    }

    #[test]
    fn index_size_rounds_to_granularity() {
        assert_eq!(index_size_for(1630), 0x1A00);
        assert_eq!(index_size_for(4002), 0x3F00);
        assert_eq!(index_size_for(63), 0x100);
        assert_eq!(index_size_for(64), 0x200);
    }

    #[test]
    fn fixed_field_stops_at_first_nul() {
        assert_eq!(read_fixed_field(b"1.3.0\0\0\0", "version"), b"1.3.0");
        assert_eq!(read_fixed_field(b"full", "version"), b"full");
        assert_eq!(read_fixed_field(b"ab\0cd", "version"), b"ab");
    }

    #[test]
    fn fixed_field_rejects_overlong_value() {
        let mut out = [0xAAu8; 4];
        write_fixed_field(&mut out, b"ab", "name").unwrap();
        assert_eq!(out, [b'a', b'b', 0, 0]);

        let err = write_fixed_field(&mut out, b"abcde", "name").unwrap_err();
        assert_eq!(
            err,
            Violation::FieldTooLong {
                field: "name",
                len: 5,
                max: 4
            }
        );
    }
}
