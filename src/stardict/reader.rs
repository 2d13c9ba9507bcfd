use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

use log::{debug, info};
use walkdir::WalkDir;

use super::codec::compression;
use super::format::content::DictContent;
use super::format::{idx, ifo};
use super::iter::DefinitionIterator;
use super::types::error::{Result, StardictError};
use super::types::models::*;
use super::utils;

/// How deep to look for a triad below the source directory. Extracted
/// archives usually wrap the files in one or two folders.
const MAX_SEARCH_DEPTH: usize = 3;

/// The main reader for StarDict dictionaries.
///
/// Opening a dictionary parses `.ifo` and the whole `.idx` eagerly; definitions
/// are resolved lazily from the `.dict` payload.
#[derive(Debug)]
pub struct StarDictReader {
    files: DictFiles,
    pub info: DictInfo,
    scan: IndexScan,
    content: DictContent,
}

impl StarDictReader {
    /// Locate the triad under `dir` and open it.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Any of `.ifo`, `.idx`, `.dict`/`.dict.dz` is missing
    /// - A file cannot be read or a compressed stream is corrupt
    /// - `.ifo` declares an unsupported `idxoffsetbits`
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let files = Self::locate(dir)?;
        Self::open_files(files)
    }

    /// Finds the `.ifo`, `.idx` (or `.idx.gz`) and `.dict.dz` (or `.dict`)
    /// files below `dir`. When several candidates exist the first in file-name
    /// order wins.
    pub fn locate(dir: impl AsRef<Path>) -> Result<DictFiles> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(StardictError::MissingFile {
                kind: "source directory",
                dir: dir.to_path_buf(),
            });
        }

        let mut ifo = None;
        let mut idx = None;
        let mut dict_dz = None;
        let mut dict = None;

        for entry in WalkDir::new(dir)
            .max_depth(MAX_SEARCH_DEPTH)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let name = entry.file_name().to_string_lossy().to_ascii_lowercase();
            let slot = if name.ends_with(".ifo") {
                &mut ifo
            } else if name.ends_with(".idx") || name.ends_with(".idx.gz") {
                &mut idx
            } else if name.ends_with(".dict.dz") {
                &mut dict_dz
            } else if name.ends_with(".dict") {
                &mut dict
            } else {
                continue;
            };
            if slot.is_none() {
                *slot = Some(entry.into_path());
            }
        }

        let missing = |kind| StardictError::MissingFile { kind, dir: dir.to_path_buf() };
        let files = DictFiles {
            ifo: ifo.ok_or_else(|| missing(".ifo"))?,
            idx: idx.ok_or_else(|| missing(".idx"))?,
            dict: dict_dz.or(dict).ok_or_else(|| missing(".dict"))?,
        };
        debug!(
            "Located StarDict triad: ifo={}, idx={}, dict={}",
            files.ifo.display(),
            files.idx.display(),
            files.dict.display()
        );
        Ok(files)
    }

    /// Open an already-located triad.
    pub fn open_files(files: DictFiles) -> Result<Self> {
        info!("Opening StarDict dictionary: {}", files.ifo.display());

        let info = ifo::parse(&mut File::open(&files.ifo)?)?;
        let offset_width = info.offset_width()?;

        let scan = if files.idx_is_gzipped() {
            let bytes = compression::inflate_gzip(BufReader::new(File::open(&files.idx)?))?;
            idx::parse(&mut Cursor::new(bytes), offset_width)?
        } else {
            idx::parse(&mut BufReader::new(File::open(&files.idx)?), offset_width)?
        };

        let content = DictContent::open(&files.dict)?;

        info!(
            "StarDict opened: '{}', {} index entries (declared {}), {} undecodable, payload {} bytes",
            info.bookname().unwrap_or("Unknown"),
            scan.entries.len(),
            info.wordcount().map_or_else(|| "unknown".to_string(), |n| n.to_string()),
            scan.undecodable_words,
            content.len()
        );

        Ok(Self { files, info, scan, content })
    }

    pub fn files(&self) -> &DictFiles {
        &self.files
    }

    /// Index entries in file order.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.scan.entries
    }

    pub fn num_entries(&self) -> usize {
        self.scan.entries.len()
    }

    /// Index words dropped because they were not valid UTF-8.
    pub fn undecodable_words(&self) -> u64 {
        self.scan.undecodable_words
    }

    /// `true` if the index ended inside a record.
    pub fn index_truncated(&self) -> bool {
        self.scan.truncated
    }

    /// Returns the raw definition bytes for an index entry.
    pub fn read_raw(&self, entry: &IndexEntry) -> Result<Vec<u8>> {
        self.content.read_range(entry.offset, entry.size)
    }

    /// Reads and decodes the definition for an index entry.
    pub fn read_definition(&self, entry: &IndexEntry) -> Result<String> {
        let bytes = self.read_raw(entry)?;
        Ok(utils::decode_definition(&bytes))
    }

    /// Iterates `(entry, definition)` pairs in index order.
    ///
    /// Per-record failures are yielded rather than ending the iteration, so a
    /// caller can count and skip them.
    pub fn iter_definitions(&self) -> DefinitionIterator<'_> {
        DefinitionIterator::new(self)
    }
}
