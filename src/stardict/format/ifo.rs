//! `.ifo` metadata parsing.

use std::collections::HashMap;
use std::io::Read;

use encoding_rs::UTF_8;
use log::debug;

use crate::stardict::types::error::Result;
use crate::stardict::types::models::DictInfo;

/// Parses `key=value` lines.
///
/// The first `=` splits key from value; lines without `=` (including the
/// `StarDict's dict ifo file` banner) are ignored. No schema validation.
pub fn parse<R: Read>(reader: &mut R) -> Result<DictInfo> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let (text, _) = UTF_8.decode_with_bom_removal(&bytes);

    let fields: HashMap<String, String> = text
        .lines()
        .filter_map(|line| line.trim().split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();

    debug!("Parsed {} .ifo fields", fields.len());
    Ok(DictInfo { fields })
}
