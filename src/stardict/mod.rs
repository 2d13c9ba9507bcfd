//! StarDict dictionary reader.
//!
//! A StarDict dictionary is a triad of files sharing a stem:
//!
//! ```text
//! name.ifo      key=value metadata (UTF-8)
//! name.idx      {word\0}{offset BE}{size u32 BE} ...   (may be name.idx.gz)
//! name.dict     definition blobs addressed by the index (may be name.dict.dz)
//! ```
//!
//! [`StarDictReader`] locates and opens the triad, parses the index in a
//! single forward pass and resolves index entries to definition text.

pub mod codec;
pub mod format;
mod iter;
mod reader;
pub mod types;
mod utils;

pub use iter::DefinitionIterator;
pub use reader::StarDictReader;
pub use types::error::{Result, StardictError};
pub use types::models::{DictFiles, DictInfo, IndexEntry, IndexScan};
pub use utils::decode_definition;
