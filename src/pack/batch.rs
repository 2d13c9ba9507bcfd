use log::{info, warn};

use super::pipeline::{PackBuilder, PackReport, PackRequest};
use crate::error::PackFailure;

/// Outcome of a multi-pack run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub built: Vec<PackReport>,
    pub failed: Vec<PackFailure>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Entries across all built packs.
    pub fn total_entries(&self) -> u64 {
        self.built.iter().map(|report| report.counts.total()).sum()
    }
}

/// Builds every request in order. A failed pack is recorded and the run
/// moves on to the next one.
pub fn run_batch(builder: &PackBuilder, requests: &[PackRequest]) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for (i, request) in requests.iter().enumerate() {
        info!("[{}/{}] {}", i + 1, requests.len(), request.pack_id);
        match builder.build(request) {
            Ok(report) => summary.built.push(report),
            Err(failure) => {
                warn!("Continuing after failure: {}", failure);
                summary.failed.push(failure);
            }
        }
    }
    info!(
        "Batch finished: {} built, {} failed, {} entries",
        summary.built.len(),
        summary.failed.len(),
        summary.total_entries()
    );
    summary
}
