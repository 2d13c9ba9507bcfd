//! Resolving a pack's source to something the converter can read.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use super::archive;
use super::remote::DictionaryArchiveFetcher;
use crate::bidi::{EntrySource, SqliteTableSource};
use crate::error::{PackError, Result};
use crate::stardict::{StarDictReader, StardictError};

const ZIP_MAGIC: [u8; 4] = [b'P', b'K', 0x03, 0x04];
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const SQLITE_EXTENSIONS: [&str; 3] = ["sqlite", "sqlite3", "db"];

/// Where a pack's dictionary comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackSource {
    /// A directory holding a StarDict triad (possibly nested) or a SQLite file.
    Directory(PathBuf),
    /// A SQLite file with a `dict` or `word` table.
    Sqlite(PathBuf),
    /// A zip archive containing either of the above.
    Archive(PathBuf),
    /// A `.tar.gz` / `.tgz` archive containing either of the above.
    TarGz(PathBuf),
    /// An `http(s)://` URL to any of the above.
    Url(String),
}

impl PackSource {
    /// Classifies a CLI/config source string.
    ///
    /// `file://` URLs become local sources; local paths are classified by
    /// extension, with anything unrecognized treated as a directory.
    pub fn parse(source: &str) -> Self {
        let source = source.trim();
        if source.starts_with("http://") || source.starts_with("https://") {
            return PackSource::Url(source.to_string());
        }
        let path = PathBuf::from(source.strip_prefix("file://").unwrap_or(source));
        Self::from_path(path)
    }

    pub fn from_path(path: PathBuf) -> Self {
        if path.is_dir() {
            return PackSource::Directory(path);
        }
        match ArchiveFormat::from_name(&path) {
            Some(ArchiveFormat::Zip) => return PackSource::Archive(path),
            Some(ArchiveFormat::TarGz) => return PackSource::TarGz(path),
            None => {}
        }
        match extension_of(&path) {
            Some(ext) if SQLITE_EXTENSIONS.contains(&ext.as_str()) => PackSource::Sqlite(path),
            _ => PackSource::Directory(path),
        }
    }

    /// Downloads and extracts as needed, returning a local directory or
    /// SQLite file. Scratch files go under `work_dir`.
    pub fn materialize(
        &self,
        work_dir: &Path,
        fetcher: &dyn DictionaryArchiveFetcher,
    ) -> Result<PathBuf> {
        match self {
            PackSource::Directory(path) | PackSource::Sqlite(path) => {
                if path.exists() {
                    Ok(path.clone())
                } else {
                    Err(PackError::SourceNotFound(path.display().to_string()))
                }
            }
            PackSource::Archive(path) => extract_local(path, ArchiveFormat::Zip, work_dir),
            PackSource::TarGz(path) => extract_local(path, ArchiveFormat::TarGz, work_dir),
            PackSource::Url(url) => {
                let downloaded = fetcher.fetch(url, &work_dir.join("download"))?;
                match ArchiveFormat::detect(&downloaded)? {
                    Some(format) => extract_into(&downloaded, format, work_dir),
                    None => Ok(downloaded),
                }
            }
        }
    }
}

impl fmt::Display for PackSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PackSource::Directory(path) => write!(f, "directory {}", path.display()),
            PackSource::Sqlite(path) => write!(f, "SQLite file {}", path.display()),
            PackSource::Archive(path) => write!(f, "archive {}", path.display()),
            PackSource::TarGz(path) => write!(f, "tar.gz archive {}", path.display()),
            PackSource::Url(url) => write!(f, "URL {}", url),
        }
    }
}

/// Opens a materialized source.
///
/// Files are read as SQLite sources. Directories are read as StarDict
/// triads, falling back to the first SQLite file found inside.
pub fn open_entry_source(path: &Path) -> Result<Box<dyn EntrySource>> {
    if path.is_file() {
        return Ok(Box::new(SqliteTableSource::open(path)?));
    }

    match StarDictReader::open(path) {
        Ok(reader) => Ok(Box::new(reader)),
        Err(missing @ StardictError::MissingFile { .. }) => match find_sqlite_file(path) {
            Some(db) => {
                info!("No StarDict triad in {}, using {}", path.display(), db.display());
                Ok(Box::new(SqliteTableSource::open(db)?))
            }
            None => Err(missing.into()),
        },
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    fn from_name(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        if name.ends_with(".zip") {
            Some(ArchiveFormat::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveFormat::TarGz)
        } else {
            None
        }
    }

    /// By name, else by leading magic bytes.
    fn detect(path: &Path) -> Result<Option<Self>> {
        if let Some(format) = Self::from_name(path) {
            return Ok(Some(format));
        }
        let mut magic = [0u8; 4];
        let mut file = File::open(path)?;
        let read = file.read(&mut magic)?;
        Ok(if read == ZIP_MAGIC.len() && magic == ZIP_MAGIC {
            Some(ArchiveFormat::Zip)
        } else if read >= GZIP_MAGIC.len() && magic[..2] == GZIP_MAGIC {
            Some(ArchiveFormat::TarGz)
        } else {
            None
        })
    }
}

fn extract_local(path: &Path, format: ArchiveFormat, work_dir: &Path) -> Result<PathBuf> {
    if !path.is_file() {
        return Err(PackError::SourceNotFound(path.display().to_string()));
    }
    extract_into(path, format, work_dir)
}

fn extract_into(archive_path: &Path, format: ArchiveFormat, work_dir: &Path) -> Result<PathBuf> {
    let dest = work_dir.join("extracted");
    let files = match format {
        ArchiveFormat::Zip => archive::extract_zip(archive_path, &dest)?,
        ArchiveFormat::TarGz => archive::extract_tar_gz(archive_path, &dest)?,
    };
    if files.is_empty() {
        return Err(PackError::UnreadableArchive(format!("{} is empty", archive_path.display())));
    }
    Ok(dest)
}

fn find_sqlite_file(dir: &Path) -> Option<PathBuf> {
    WalkDir::new(dir)
        .max_depth(3)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .find(|path| {
            let found =
                extension_of(path).is_some_and(|ext| SQLITE_EXTENSIONS.contains(&ext.as_str()));
            if found {
                debug!("Found SQLite candidate {}", path.display());
            }
            found
        })
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension().map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}
