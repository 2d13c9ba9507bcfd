//! # Pack Store
//!
//! The SQLite side of a pack: schema and metadata, batched writes, and the
//! lookup query used by downstream tooling.

pub mod lookup;
pub mod schema;
mod writer;

pub use lookup::{count_by_direction, lookup, open_pack, read_metadata, DirectionCounts};
pub use schema::{PackMetadata, PACK_TYPE, SCHEMA_VERSION};
pub use writer::PackWriter;
