//! File format parsing layer for StarDict dictionaries.
//!
//! This module bridges raw file I/O and the high-level
//! [`StarDictReader`](crate::stardict::StarDictReader).
//!
//! # Module Organization
//!
//! - [`ifo`]: Parses the `key=value` metadata file
//! - [`idx`]: Parses the word index in a single forward pass
//! - [`content`]: Resolves `(offset, size)` pairs against the definition payload
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  name.ifo       │ ← ifo::parse()
//! ├─────────────────┤
//! │  name.idx[.gz]  │ ← idx::parse()
//! ├─────────────────┤
//! │  name.dict[.dz] │ ← content::DictContent::read_range()
//! └─────────────────┘
//! ```

pub mod content;
pub mod idx;
pub mod ifo;
