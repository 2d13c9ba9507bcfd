use std::fmt;

use serde::Serialize;

/// Counters for one conversion run.
///
/// Threaded through the pipeline so a failed pack can still report how far
/// it got.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    /// Source records seen, including skipped ones.
    pub processed: u64,
    /// Forward rows written.
    pub forward: u64,
    /// Reverse rows written.
    pub reverse: u64,
    /// Records dropped: unreadable, empty word, or empty after cleanup.
    pub skipped: u64,
    /// Rows dropped by the dedup policy.
    pub duplicates: u64,
    /// Index words dropped before conversion for invalid UTF-8.
    pub undecodable_words: u64,
    /// The source index ended inside a record.
    pub index_truncated: bool,
}

impl ConversionStats {
    pub fn total(&self) -> u64 {
        self.forward + self.reverse
    }
}

impl fmt::Display for ConversionStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} processed, {} forward + {} reverse = {} total, {} skipped",
            self.processed,
            self.forward,
            self.reverse,
            self.total(),
            self.skipped + self.undecodable_words
        )?;
        if self.duplicates > 0 {
            write!(f, ", {} duplicates dropped", self.duplicates)?;
        }
        if self.index_truncated {
            write!(f, " (index truncated)")?;
        }
        Ok(())
    }
}
