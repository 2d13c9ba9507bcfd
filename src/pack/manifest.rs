//! Registry record emitted next to each pack.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::{PACK_TYPE, SCHEMA_VERSION};

/// Value of the `source` field for every pack built by this tool.
pub const MANIFEST_SOURCE: &str = "wiktionary-stardict";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestRecord {
    pub id: String,
    pub name: String,
    pub source_language: String,
    pub target_language: String,
    pub pack_type: String,
    pub schema_version: String,
    pub total_entries: u64,
    pub forward_entries: u64,
    pub reverse_entries: u64,
    /// Size of the zip archive.
    pub size_bytes: u64,
    /// `size_bytes` in MiB, rounded to one decimal.
    pub size_mb: f64,
    /// Lowercase hex SHA-256 of the zip archive.
    pub checksum: String,
    pub source: String,
    /// `YYYY-MM-DD` build date.
    pub created_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl ManifestRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: &str,
        name: &str,
        source_language: &str,
        target_language: &str,
        forward_entries: u64,
        reverse_entries: u64,
        size_bytes: u64,
        checksum: String,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            pack_type: PACK_TYPE.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            total_entries: forward_entries + reverse_entries,
            forward_entries,
            reverse_entries,
            size_bytes,
            size_mb: size_in_mb(size_bytes),
            checksum,
            source: MANIFEST_SOURCE.to_string(),
            created_date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            download_url: None,
        }
    }

    /// `<pack_id>-manifest.json` inside `output_dir`.
    pub fn path_for(output_dir: &Path, pack_id: &str) -> PathBuf {
        output_dir.join(format!("{}-manifest.json", pack_id))
    }

    /// Writes pretty-printed JSON to `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content + "\n")?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

fn size_in_mb(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 / 1024.0 * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_and_size_are_derived() {
        let size = 3 * 1024 * 1024 + 200_000;
        let record =
            ManifestRecord::new("fr-en", "French ↔ English", "fr", "en", 3, 4, size, "ab".into());
        assert_eq!(record.total_entries, 7);
        assert_eq!(record.size_mb, 3.2);
        assert_eq!(record.pack_type, "bidirectional");
    }

    #[test]
    fn download_url_is_omitted_when_absent() {
        let record = ManifestRecord::new("de-en", "German", "de", "en", 1, 0, 10, "cd".into());
        let json = serde_json::to_value(&record).expect("serialize");
        assert!(json.get("download_url").is_none());
        assert_eq!(json["checksum"], "cd");
    }
}
