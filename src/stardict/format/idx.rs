//! # Word Index Parsing
//!
//! An `.idx` file is a flat sequence of records with no header:
//!
//! ```text
//! [N bytes]   word, UTF-8, terminated by 0x00
//! [4|8 bytes] offset into the definition payload (big-endian)
//! [4 bytes]   definition size (big-endian u32)
//! ```
//!
//! The parser makes a single forward pass and never seeks, so it works on
//! gzip-decoded streams as well as plain files.

use std::io::BufRead;

use log::{trace, warn};

use crate::stardict::types::error::Result;
use crate::stardict::types::models::{IndexEntry, IndexScan, OffsetWidth};
use crate::stardict::utils;

/// Size fields are always 32-bit, even with 64-bit offsets.
const SIZE_WIDTH: usize = 4;

/// Parses every record from an index stream, preserving file order.
///
/// - An empty word token ends the scan cleanly.
/// - A stream that ends inside a record (missing terminator, short
///   offset/size field) ends the scan with `truncated = true`; all earlier
///   records are kept.
/// - A word that is not valid UTF-8 drops that record (its offset and size
///   are consumed) and increments `undecodable_words`.
///
/// # Errors
/// Only underlying I/O failures are reported.
pub fn parse<R: BufRead>(reader: &mut R, offset_width: OffsetWidth) -> Result<IndexScan> {
    let mut scan = IndexScan::default();
    let mut word_bytes = Vec::new();

    loop {
        word_bytes.clear();
        let read = reader.read_until(0, &mut word_bytes)?;
        if read == 0 {
            break;
        }
        if word_bytes.last() != Some(&0) {
            scan.truncated = true;
            break;
        }
        word_bytes.pop();
        if word_bytes.is_empty() {
            break;
        }

        let Some(offset) = utils::read_number(reader, offset_width.number_width())? else {
            scan.truncated = true;
            break;
        };
        let Some(size) = utils::read_number(reader, SIZE_WIDTH)? else {
            scan.truncated = true;
            break;
        };

        match utils::decode_utf8_strict(&word_bytes) {
            Some(word) => scan.entries.push(IndexEntry {
                word,
                offset,
                // SIZE_WIDTH is 4 bytes, so this never truncates
                size: size as u32,
            }),
            None => {
                trace!("Dropping index word with invalid UTF-8 ({} bytes)", word_bytes.len());
                scan.undecodable_words += 1;
            }
        }
    }

    if scan.truncated {
        warn!(
            "Truncated index: kept {} entries before the corrupt tail",
            scan.entries.len()
        );
    }
    Ok(scan)
}
