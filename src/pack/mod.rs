//! Pack building: source resolution, conversion into a fresh database,
//! packaging, publication and the multi-pack driver.

pub mod archive;
mod batch;
pub mod manifest;
mod pipeline;
pub mod remote;
pub mod source;

pub use batch::{run_batch, BatchSummary};
pub use manifest::ManifestRecord;
pub use pipeline::{PackBuilder, PackReport, PackRequest};
pub use remote::{DictionaryArchiveFetcher, DirectoryPublisher, HttpFetcher, ReleasePublisher};
pub use source::{open_entry_source, PackSource};
