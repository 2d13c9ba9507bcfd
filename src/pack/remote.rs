//! Collaborators at the edges of the pipeline: where archives come from and
//! where finished packs go.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};

use crate::error::{PackError, Result};

/// Downloads a source archive.
pub trait DictionaryArchiveFetcher {
    /// Stores the resource behind `url` inside `dest_dir` and returns its path.
    fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf>;
}

/// Makes a finished archive available and returns its public URL.
pub trait ReleasePublisher {
    /// `archive` may be a temporary file; `file_name` is the name the
    /// archive is released under.
    fn publish(&self, archive: &Path, file_name: &str) -> Result<String>;
}

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Blocking HTTP(S) downloads.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .build();
        Self { agent }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl DictionaryArchiveFetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        info!("Downloading {}", url);
        let response = match self.agent.get(url).call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, _)) => {
                return Err(PackError::Fetch(format!("{} returned HTTP {}", url, code)));
            }
            Err(err) => return Err(PackError::Fetch(format!("{}: {}", url, err))),
        };

        fs::create_dir_all(dest_dir)?;
        let dest = dest_dir.join(file_name_from_url(url));
        let mut out = BufWriter::new(File::create(&dest)?);
        let bytes = io::copy(&mut response.into_reader(), &mut out)
            .map_err(|e| PackError::Fetch(format!("{}: {}", url, e)))?;
        out.flush()?;
        debug!("Downloaded {} bytes to {}", bytes, dest.display());
        Ok(dest)
    }
}

/// Last non-empty path segment of `url`, without query or fragment.
fn file_name_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let after_scheme = path.split_once("://").map_or(path, |(_, rest)| rest);
    after_scheme
        .split('/')
        .skip(1)
        .filter(|segment| !segment.is_empty())
        .last()
        .unwrap_or("download")
        .to_string()
}

/// Copies archives into a release directory.
pub struct DirectoryPublisher {
    dir: PathBuf,
    base_url: Option<String>,
}

impl DirectoryPublisher {
    /// Published URLs are `<base_url>/<file name>`, or the copied path
    /// when no base URL is set.
    pub fn new(dir: impl Into<PathBuf>, base_url: Option<String>) -> Self {
        Self {
            dir: dir.into(),
            base_url,
        }
    }
}

impl ReleasePublisher for DirectoryPublisher {
    fn publish(&self, archive: &Path, file_name: &str) -> Result<String> {
        fs::create_dir_all(&self.dir)?;
        let dest = self.dir.join(file_name);
        fs::copy(archive, &dest)
            .map_err(|e| PackError::Publish(format!("{}: {}", dest.display(), e)))?;

        let url = match &self.base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), file_name),
            None => dest.display().to_string(),
        };
        info!("Published {} as {}", archive.display(), url);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_ignores_query_and_trailing_slash() {
        assert_eq!(file_name_from_url("https://host/a/fr-en.zip?dl=1"), "fr-en.zip");
        assert_eq!(file_name_from_url("https://host/a/dump/"), "dump");
        assert_eq!(file_name_from_url("https://host"), "download");
    }

    #[test]
    fn directory_publisher_builds_url() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = dir.path().join(".fr-en-tmp.zip");
        fs::write(&archive, b"zip").expect("write");
        let base_url = Some("https://cdn.test/v2/".to_string());
        let publisher = DirectoryPublisher::new(dir.path().join("release"), base_url);

        let url = publisher.publish(&archive, "fr-en.sqlite.zip").expect("publish");
        assert_eq!(url, "https://cdn.test/v2/fr-en.sqlite.zip");
        assert!(dir.path().join("release/fr-en.sqlite.zip").is_file());
    }
}
