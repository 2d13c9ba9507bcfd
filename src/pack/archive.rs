//! Zip packaging, checksums and archive extraction.

use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use log::debug;
use sha2::{Digest, Sha256};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{PackError, Result};

/// Entries at or above this size need zip64 headers.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Writes `source` into `dest` as a single deflated entry named `entry_name`.
pub fn zip_single_file<W: Write + io::Seek>(source: &Path, entry_name: &str, dest: W) -> Result<W> {
    let mut input = BufReader::new(File::open(source)?);
    let size = fs::metadata(source)?.len();
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(size >= ZIP64_THRESHOLD);

    let mut writer = ZipWriter::new(dest);
    writer.start_file(entry_name, options)?;
    io::copy(&mut input, &mut writer)?;
    let dest = writer.finish()?;
    debug!("Zipped {} ({} bytes) as '{}'", source.display(), size, entry_name);
    Ok(dest)
}

/// Lowercase hex SHA-256 of a file's bytes.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Extracts every file of `archive` under `dest`, returning the extracted paths.
///
/// Entries whose names escape `dest` are skipped.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(BufReader::new(file))
        .map_err(|e| PackError::UnreadableArchive(format!("{}: {}", archive.display(), e)))?;

    let mut extracted = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| PackError::UnreadableArchive(format!("{}: {}", archive.display(), e)))?;
        let out_path = match entry.enclosed_name() {
            Some(name) => dest.join(name),
            None => continue,
        };
        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
        extracted.push(out_path);
    }
    debug!("Extracted {} files from {}", extracted.len(), archive.display());
    Ok(extracted)
}

/// Extracts the regular files of a gzip-compressed tar under `dest`.
///
/// Entries whose names escape `dest`, and links, are skipped.
pub fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let unreadable =
        |e: io::Error| PackError::UnreadableArchive(format!("{}: {}", archive.display(), e));
    let file = File::open(archive)?;
    let mut tar = tar::Archive::new(GzDecoder::new(BufReader::new(file)));

    let mut extracted = Vec::new();
    for entry in tar.entries().map_err(unreadable)? {
        let mut entry = entry.map_err(unreadable)?;
        let name = entry.path().map_err(unreadable)?.into_owned();
        let out_path = match enclosed_name(&name) {
            Some(relative) => dest.join(relative),
            None => {
                debug!("Skipping tar entry {}", name.display());
                continue;
            }
        };
        let kind = entry.header().entry_type();
        if kind.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if !kind.is_file() {
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        io::copy(&mut entry, &mut out).map_err(unreadable)?;
        extracted.push(out_path);
    }
    debug!("Extracted {} files from {}", extracted.len(), archive.display());
    Ok(extracted)
}

/// `name` as a relative path made of normal components only.
fn enclosed_name(name: &Path) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in name.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if relative.as_os_str().is_empty() {
        None
    } else {
        Some(relative)
    }
}
