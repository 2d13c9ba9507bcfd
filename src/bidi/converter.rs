//! # Bidirectional Conversion
//!
//! Turns an ordered `(word, definition)` sequence into forward rows (one per
//! usable record) and reverse rows (zero or more per record), buffering them
//! per direction and flushing full batches to an [`EntrySink`].

use std::collections::HashSet;

use clap::ValueEnum;
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use super::cleanup;
use super::models::{Direction, EntryRow, LanguagePair};
use super::reverse::{self, ReverseStrategy, MAX_REVERSE_CANDIDATES};
use super::source::{EntrySource, SourceRecord};
use super::stats::ConversionStats;
use crate::error::Result;

/// Conventional flush size for both directions.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Progress is logged every this many processed records.
const PROGRESS_INTERVAL: u64 = 5000;

/// What to do with repeated `(lemma, definition)` pairs within a direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DedupPolicy {
    /// Write every row; lookups tolerate duplicates.
    #[default]
    KeepAll,
    /// Keep the first occurrence in source order, drop later repeats.
    PreserveFirst,
}

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// `None` picks a strategy from the source shape.
    pub reverse_strategy: Option<ReverseStrategy>,
    pub dedup: DedupPolicy,
    pub batch_size: usize,
    pub max_reverse_candidates: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            reverse_strategy: None,
            dedup: DedupPolicy::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_reverse_candidates: MAX_REVERSE_CANDIDATES,
        }
    }
}

/// Destination for converted rows.
///
/// Each call receives rows of a single direction; implementations commit
/// the batch before returning.
pub trait EntrySink {
    fn write_batch(&mut self, direction: Direction, rows: &[EntryRow]) -> Result<()>;
}

/// Rows derived from one source record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRows {
    pub forward: EntryRow,
    /// Reverse rows: candidate lemma → original word.
    pub reverse: Vec<EntryRow>,
}

/// Converts one record, or returns `None` if it must be skipped.
///
/// The forward row stores the short cleaned gloss; reverse candidates are
/// extracted from the full raw definition.
pub fn convert_record(
    word: &str,
    definition: &str,
    target_language: &str,
    strategy: ReverseStrategy,
    max_reverse: usize,
) -> Option<RecordRows> {
    let word = word.trim();
    let definition = definition.trim();
    if word.is_empty() || definition.is_empty() {
        return None;
    }

    let gloss = cleanup::clean_gloss(definition);
    if gloss.is_empty() {
        return None;
    }

    let candidates = reverse::extract_reverse_candidates(
        definition,
        word,
        target_language,
        strategy,
        max_reverse,
    );
    let reverse = candidates
        .into_iter()
        .map(|candidate| EntryRow::new(candidate, word))
        .collect();

    Some(RecordRows {
        forward: EntryRow::new(word, gloss),
        reverse,
    })
}

#[derive(Debug)]
pub struct BidirectionalConverter {
    options: ConvertOptions,
}

impl BidirectionalConverter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Explicit option wins; otherwise HTML-declaring sources use
    /// [`ReverseStrategy::HtmlTerms`] and everything else splits on separators.
    pub fn resolve_strategy<S: EntrySource + ?Sized>(&self, source: &S) -> ReverseStrategy {
        self.options.reverse_strategy.unwrap_or(if source.declares_html() {
            ReverseStrategy::HtmlTerms
        } else {
            ReverseStrategy::SeparatorSplit
        })
    }

    /// Converts every record of `source` and writes the rows to `sink`.
    ///
    /// `stats` is updated as records are processed, so on error it holds the
    /// counts reached so far. Per-record problems are counted as skipped;
    /// only source-level and sink failures are returned as errors.
    pub fn convert<S, W>(
        &self,
        source: &mut S,
        sink: &mut W,
        pair: &LanguagePair,
        stats: &mut ConversionStats,
    ) -> Result<()>
    where
        S: EntrySource + ?Sized,
        W: EntrySink + ?Sized,
    {
        let strategy = self.resolve_strategy(source);
        let batch_size = self.options.batch_size.max(1);
        let total = source.len_hint();
        stats.undecodable_words += source.undecodable_words();
        stats.index_truncated |= source.truncated();
        info!(
            "Converting {} source ({} records) to {} with {} reverse extraction",
            source.provenance(),
            total.map_or_else(|| "unknown".to_string(), |n| n.to_string()),
            pair,
            strategy
        );

        let mut buffers = Buffers::new(batch_size, self.options.dedup);

        for record in source.records() {
            let record = record?;
            stats.processed += 1;

            let (word, definition) = match record {
                SourceRecord::Entry { word, definition } => (word, definition),
                SourceRecord::Unreadable { word, reason } => {
                    debug!("Skipping '{}': {}", word, reason);
                    stats.skipped += 1;
                    continue;
                }
            };

            match convert_record(
                &word,
                &definition,
                &pair.target,
                strategy,
                self.options.max_reverse_candidates,
            ) {
                Some(rows) => {
                    buffers.push(Direction::Forward, rows.forward, sink, stats)?;
                    for row in rows.reverse {
                        buffers.push(Direction::Reverse, row, sink, stats)?;
                    }
                }
                None => {
                    trace!("Skipping '{}': empty after cleanup", word);
                    stats.skipped += 1;
                }
            }

            if stats.processed % PROGRESS_INTERVAL == 0 {
                match total {
                    Some(total) if total > 0 => info!(
                        "Progress: {}/{} ({:.1}%)",
                        stats.processed,
                        total,
                        stats.processed as f64 / total as f64 * 100.0
                    ),
                    _ => info!("Progress: {} records", stats.processed),
                }
            }
        }

        buffers.flush(Direction::Forward, sink, stats)?;
        buffers.flush(Direction::Reverse, sink, stats)?;

        if stats.index_truncated {
            warn!("Source index was truncated; conversion used the readable prefix only");
        }
        info!("Conversion finished for {}: {}", pair.pack_id(), stats);
        Ok(())
    }
}

/// Per-direction row buffers plus optional dedup state.
struct Buffers {
    batch_size: usize,
    forward: Vec<EntryRow>,
    reverse: Vec<EntryRow>,
    seen: Option<(HashSet<EntryRow>, HashSet<EntryRow>)>,
}

impl Buffers {
    fn new(batch_size: usize, dedup: DedupPolicy) -> Self {
        Self {
            batch_size,
            forward: Vec::with_capacity(batch_size),
            reverse: Vec::with_capacity(batch_size),
            seen: match dedup {
                DedupPolicy::KeepAll => None,
                DedupPolicy::PreserveFirst => Some((HashSet::new(), HashSet::new())),
            },
        }
    }

    fn push<W: EntrySink + ?Sized>(
        &mut self,
        direction: Direction,
        row: EntryRow,
        sink: &mut W,
        stats: &mut ConversionStats,
    ) -> Result<()> {
        if let Some((seen_forward, seen_reverse)) = self.seen.as_mut() {
            let seen = match direction {
                Direction::Forward => seen_forward,
                Direction::Reverse => seen_reverse,
            };
            if !seen.insert(row.clone()) {
                stats.duplicates += 1;
                return Ok(());
            }
        }

        let batch_size = self.batch_size;
        let buffer = self.buffer_mut(direction);
        buffer.push(row);
        if buffer.len() >= batch_size {
            self.flush(direction, sink, stats)?;
        }
        Ok(())
    }

    fn flush<W: EntrySink + ?Sized>(
        &mut self,
        direction: Direction,
        sink: &mut W,
        stats: &mut ConversionStats,
    ) -> Result<()> {
        let buffer = self.buffer_mut(direction);
        if buffer.is_empty() {
            return Ok(());
        }
        sink.write_batch(direction, buffer)?;
        let written = buffer.len() as u64;
        buffer.clear();
        match direction {
            Direction::Forward => stats.forward += written,
            Direction::Reverse => stats.reverse += written,
        }
        trace!("Flushed {} {} rows", written, direction);
        Ok(())
    }

    fn buffer_mut(&mut self, direction: Direction) -> &mut Vec<EntryRow> {
        match direction {
            Direction::Forward => &mut self.forward,
            Direction::Reverse => &mut self.reverse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(word: &str, definition: &str) -> Option<RecordRows> {
        convert_record(
            word,
            definition,
            "en",
            ReverseStrategy::SeparatorSplit,
            MAX_REVERSE_CANDIDATES,
        )
    }

    #[test]
    fn forward_uses_gloss_reverse_uses_raw_definition() {
        let out = rows("courir", "1. to run; to race").expect("record kept");
        assert_eq!(out.forward, EntryRow::new("courir", "to run"));
        assert_eq!(out.reverse, vec![
            EntryRow::new("1. to run", "courir"),
            EntryRow::new("to race", "courir"),
        ]);
    }

    #[test]
    fn blank_word_or_definition_is_skipped() {
        assert!(rows("  ", "cat").is_none());
        assert!(rows("chat", " \n").is_none());
        assert!(rows("x", "<i></i>[ks]").is_none());
    }

    #[test]
    fn word_is_trimmed() {
        let out = rows(" chat\t", "cat").expect("record kept");
        assert_eq!(out.forward.lemma, "chat");
        assert_eq!(out.reverse[0].definition, "chat");
    }
}
