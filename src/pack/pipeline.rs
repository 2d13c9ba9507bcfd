//! # Pack Pipeline
//!
//! One pack, end to end:
//!
//! ```text
//! fetch ─► open ─► convert ─► package ─► publish ─► manifest
//!   │        │        │           │          │           │
//!   │        │        │           │          │           └─ JSON to a temp file
//!   │        │        │           │          └─ uploads the temp zip
//!   │        │        │           └─ zip + sha256 to a temp file
//!   │        │        └─ rows into a temp database in the output dir
//!   │        └─ StarDict triad, SQLite table or extracted archive
//!   └─ download / extract into a scratch dir
//! ```
//!
//! The database, zip and manifest are renamed to their final names only
//! after every step has succeeded, so a failed build leaves any previous
//! `<pack_id>.sqlite`, `<pack_id>.sqlite.zip` and manifest untouched.

use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info};
use tempfile::{Builder, TempPath};

use super::archive;
use super::manifest::ManifestRecord;
use super::remote::{DictionaryArchiveFetcher, HttpFetcher, ReleasePublisher};
use super::source::{self, PackSource};
use crate::bidi::{
    BidirectionalConverter, ConversionStats, ConvertOptions, DedupPolicy, LanguagePair,
    ReverseStrategy,
};
use crate::error::{PackError, PackFailure, PipelineStep};
use crate::store::{self, DirectionCounts, PackMetadata, PackWriter};

/// What to build.
#[derive(Debug, Clone)]
pub struct PackRequest {
    pub pack_id: String,
    pub pair: LanguagePair,
    pub source: PackSource,
    /// Display name for the manifest; defaults to `"<src> ↔ <tgt>"`.
    pub name: Option<String>,
    /// Overrides [`ConvertOptions::reverse_strategy`] for this pack.
    pub reverse_strategy: Option<ReverseStrategy>,
    /// Overrides [`ConvertOptions::dedup`] for this pack.
    pub dedup: Option<DedupPolicy>,
}

impl PackRequest {
    pub fn new(pair: LanguagePair, source: PackSource) -> Self {
        Self {
            pack_id: pair.pack_id(),
            pair,
            source,
            name: None,
            reverse_strategy: None,
            dedup: None,
        }
    }

    /// Replaces the default `<src>-<tgt>` id. Ids become file names, so only
    /// ASCII letters, digits, `-` and `_` are accepted.
    pub fn with_pack_id(mut self, pack_id: &str) -> Result<Self, PackError> {
        let valid = !pack_id.is_empty()
            && pack_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PackError::Config(format!("invalid pack id '{}'", pack_id)));
        }
        self.pack_id = pack_id.to_string();
        Ok(self)
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{} ↔ {}", self.pair.source, self.pair.target))
    }
}

/// A successfully built pack.
#[derive(Debug, Clone)]
pub struct PackReport {
    pub pack_id: String,
    pub stats: ConversionStats,
    pub counts: DirectionCounts,
    pub database: PathBuf,
    pub archive: PathBuf,
    pub manifest_path: PathBuf,
    pub manifest: ManifestRecord,
}

type StepResult<T> = Result<T, (PipelineStep, PackError)>;

trait AtStep<T> {
    fn at(self, step: PipelineStep) -> StepResult<T>;
}

impl<T, E: Into<PackError>> AtStep<T> for Result<T, E> {
    fn at(self, step: PipelineStep) -> StepResult<T> {
        self.map_err(|e| (step, e.into()))
    }
}

/// Builds packs into one output directory.
pub struct PackBuilder {
    output_dir: PathBuf,
    options: ConvertOptions,
    fetcher: Box<dyn DictionaryArchiveFetcher>,
    publisher: Option<Box<dyn ReleasePublisher>>,
}

impl PackBuilder {
    /// A builder downloading with [`HttpFetcher`] and publishing nowhere.
    pub fn new(output_dir: impl Into<PathBuf>, options: ConvertOptions) -> Self {
        Self {
            output_dir: output_dir.into(),
            options,
            fetcher: Box::new(HttpFetcher::default()),
            publisher: None,
        }
    }

    pub fn with_fetcher(mut self, fetcher: Box<dyn DictionaryArchiveFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_publisher(mut self, publisher: Box<dyn ReleasePublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Builds one pack.
    ///
    /// On failure all temporaries are removed and the error carries the
    /// failing step and the counts reached so far.
    pub fn build(&self, request: &PackRequest) -> Result<PackReport, PackFailure> {
        info!("Building pack {} ({}) from {}", request.pack_id, request.pair, request.source);
        let mut stats = ConversionStats::default();
        self.run(request, &mut stats).map_err(|(step, err)| {
            error!("Pack {} failed during {}: {}", request.pack_id, step, err);
            PackFailure::new(&request.pack_id, step, stats, err)
        })
    }

    fn options_for(&self, request: &PackRequest) -> ConvertOptions {
        let mut options = self.options.clone();
        if request.reverse_strategy.is_some() {
            options.reverse_strategy = request.reverse_strategy;
        }
        if let Some(dedup) = request.dedup {
            options.dedup = dedup;
        }
        options
    }

    fn run(&self, request: &PackRequest, stats: &mut ConversionStats) -> StepResult<PackReport> {
        let pack_id = request.pack_id.as_str();
        fs::create_dir_all(&self.output_dir).at(PipelineStep::Fetch)?;

        let work_dir = Builder::new()
            .prefix(&format!(".{}-work-", pack_id))
            .tempdir_in(&self.output_dir)
            .at(PipelineStep::Fetch)?;
        let local = request
            .source
            .materialize(work_dir.path(), self.fetcher.as_ref())
            .at(PipelineStep::Fetch)?;

        let mut entry_source = source::open_entry_source(&local).at(PipelineStep::Open)?;

        // Convert into a temp database next to the final one.
        let db_temp = Builder::new()
            .prefix(&format!(".{}-", pack_id))
            .suffix(".sqlite")
            .tempfile_in(&self.output_dir)
            .at(PipelineStep::Convert)?
            .into_temp_path();
        let metadata = PackMetadata::new(pack_id, request.pair.clone(), entry_source.provenance())
            .with_source_dict(entry_source.description());
        let mut writer = PackWriter::create(&db_temp, &metadata).at(PipelineStep::Convert)?;
        BidirectionalConverter::new(self.options_for(request))
            .convert(entry_source.as_mut(), &mut writer, &request.pair, stats)
            .at(PipelineStep::Convert)?;
        let counts = store::count_by_direction(writer.connection()).at(PipelineStep::Convert)?;
        writer.finish().at(PipelineStep::Convert)?;
        drop(entry_source);

        // Package to a temp archive and checksum it.
        let archive_name = format!("{}.sqlite.zip", pack_id);
        let (zip_file, zip_temp) = Builder::new()
            .prefix(&format!(".{}-", pack_id))
            .suffix(".zip")
            .tempfile_in(&self.output_dir)
            .at(PipelineStep::Package)?
            .into_parts();
        archive::zip_single_file(&db_temp, &format!("{}.sqlite", pack_id), zip_file)
            .at(PipelineStep::Package)?;
        let checksum = archive::sha256_file(&zip_temp).at(PipelineStep::Package)?;
        let size_bytes = fs::metadata(&zip_temp).at(PipelineStep::Package)?.len();
        info!("Packaged {} ({} bytes, sha256 {})", archive_name, size_bytes, checksum);

        let mut manifest = ManifestRecord::new(
            pack_id,
            &request.display_name(),
            &request.pair.source,
            &request.pair.target,
            counts.forward,
            counts.reverse,
            size_bytes,
            checksum,
        );

        if let Some(publisher) = &self.publisher {
            let url = publisher.publish(&zip_temp, &archive_name).at(PipelineStep::Publish)?;
            manifest.download_url = Some(url);
        }

        let manifest_temp = Builder::new()
            .prefix(&format!(".{}-", pack_id))
            .suffix(".json")
            .tempfile_in(&self.output_dir)
            .at(PipelineStep::Manifest)?
            .into_temp_path();
        manifest.write(&manifest_temp).at(PipelineStep::Manifest)?;

        // Nothing can fail past here except the renames themselves.
        let database = self.output_dir.join(format!("{}.sqlite", pack_id));
        let archive_path = self.output_dir.join(&archive_name);
        let manifest_path = ManifestRecord::path_for(&self.output_dir, pack_id);
        persist(zip_temp, &archive_path).at(PipelineStep::Package)?;
        persist(db_temp, &database).at(PipelineStep::Package)?;
        persist(manifest_temp, &manifest_path).at(PipelineStep::Manifest)?;

        info!(
            "Pack {} done: {} forward + {} reverse = {} entries",
            pack_id,
            counts.forward,
            counts.reverse,
            counts.total()
        );
        Ok(PackReport {
            pack_id: pack_id.to_string(),
            stats: *stats,
            counts,
            database,
            archive: archive_path,
            manifest_path,
            manifest,
        })
    }
}

fn persist(temp: TempPath, dest: &Path) -> Result<(), PackError> {
    temp.persist(dest).map_err(|e| PackError::Packaging(format!("{}: {}", dest.display(), e.error)))
}
