//! Sequential access to StarDict definitions.
//!
//! # Example
//! ```no_run
//! # use stardict_pack::stardict::StarDictReader;
//! # let reader = StarDictReader::open("dict_dir").unwrap();
//! for (entry, definition) in reader.iter_definitions() {
//!     match definition {
//!         Ok(text) => println!("{}: {}", entry.word, text),
//!         Err(e) => eprintln!("skipping {}: {}", entry.word, e),
//!     }
//! }
//! ```

use std::slice::Iter;

use super::reader::StarDictReader;
use super::types::error::Result;
use super::types::models::IndexEntry;

/// Iterator over index entries paired with their decoded definitions.
///
/// Created by [`StarDictReader::iter_definitions()`].
pub struct DefinitionIterator<'a> {
    reader: &'a StarDictReader,
    entries: Iter<'a, IndexEntry>,
}

impl<'a> DefinitionIterator<'a> {
    pub(super) fn new(reader: &'a StarDictReader) -> Self {
        Self {
            reader,
            entries: reader.entries().iter(),
        }
    }
}

impl<'a> Iterator for DefinitionIterator<'a> {
    type Item = (&'a IndexEntry, Result<String>);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        Some((entry, self.reader.read_definition(entry)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}
