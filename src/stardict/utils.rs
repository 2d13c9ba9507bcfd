//! Low-level byte reading and text decoding utilities

use std::io::{self, Read};

use byteorder::{BigEndian, ReadBytesExt};
use encoding_rs::UTF_8;

/// Read a 4 or 8 byte big-endian number.
///
/// Returns `Ok(None)` when the stream ends before the full width is available,
/// which callers treat as a truncated tail rather than an error.
pub fn read_number(reader: &mut impl Read, number_width: usize) -> io::Result<Option<u64>> {
    let value = match number_width {
        8 => reader.read_u64::<BigEndian>(),
        4 => reader.read_u32::<BigEndian>().map(u64::from),
        _ => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid number width: {}", number_width),
            ))
        }
    };
    match value {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e),
    }
}

/// Strict UTF-8 decode. Invalid sequences yield `None` instead of replacement characters.
pub fn decode_utf8_strict(bytes: &[u8]) -> Option<String> {
    UTF_8
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}

/// ISO-8859-1: every byte maps to the code point of the same value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Decode a definition blob: UTF-8 first, Latin-1 otherwise, then right-trim.
///
/// StarDict sources are inconsistently encoded, so the fallback never fails.
/// Trailing whitespace and NUL padding are stripped.
pub fn decode_definition(bytes: &[u8]) -> String {
    let text = decode_utf8_strict(bytes).unwrap_or_else(|| decode_latin1(bytes));
    let trimmed = text.trim_end_matches(|c: char| c.is_whitespace() || c == '\0');
    trimmed.to_owned()
}
