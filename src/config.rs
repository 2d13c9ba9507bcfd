//! TOML configuration for multi-pack runs.
//!
//! ```toml
//! output_dir = "packs"
//! batch_size = 1000
//! dedup = "keep-all"
//!
//! [publish]
//! dir = "release"
//! base_url = "https://example.invalid/releases/download/v2"
//!
//! [[packs]]
//! source_language = "fr"
//! target_language = "en"
//! source = "sources/fr-en-stardict"
//! ```
//!
//! Relative paths are resolved against the config file's directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::bidi::{
    ConvertOptions, DedupPolicy, LanguagePair, ReverseStrategy, DEFAULT_BATCH_SIZE,
    MAX_REVERSE_CANDIDATES,
};
use crate::error::{PackError, Result};
use crate::pack::{DirectoryPublisher, HttpFetcher, PackBuilder, PackRequest, PackSource};

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub dedup: DedupPolicy,
    /// Applies to every pack that does not set its own.
    #[serde(default)]
    pub reverse_strategy: Option<ReverseStrategy>,
    #[serde(default = "default_max_reverse")]
    pub max_reverse_candidates: usize,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
    #[serde(default)]
    pub publish: Option<PublishConfig>,
    #[serde(default)]
    pub packs: Vec<PackConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublishConfig {
    pub dir: PathBuf,
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackConfig {
    pub source_language: String,
    pub target_language: String,
    /// Directory, SQLite file, zip or tar.gz archive, or URL.
    pub source: String,
    #[serde(default)]
    pub pack_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub reverse_strategy: Option<ReverseStrategy>,
    #[serde(default)]
    pub dedup: Option<DedupPolicy>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("packs")
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_max_reverse() -> usize {
    MAX_REVERSE_CANDIDATES
}

fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

impl BatchConfig {
    /// Reads `path` and resolves relative paths against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| PackError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        if config.batch_size == 0 {
            return Err(PackError::Config("batch_size must be at least 1".into()));
        }
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        if self.output_dir.is_relative() {
            self.output_dir = base.join(&self.output_dir);
        }
        if let Some(publish) = self.publish.as_mut() {
            if publish.dir.is_relative() {
                publish.dir = base.join(&publish.dir);
            }
        }
        for pack in &mut self.packs {
            let is_url = pack.source.contains("://");
            if !is_url && Path::new(&pack.source).is_relative() {
                pack.source = base.join(&pack.source).to_string_lossy().into_owned();
            }
        }
    }

    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            reverse_strategy: self.reverse_strategy,
            dedup: self.dedup,
            batch_size: self.batch_size,
            max_reverse_candidates: self.max_reverse_candidates,
        }
    }

    /// A builder with the configured output dir, timeouts and publisher.
    pub fn builder(&self) -> PackBuilder {
        let fetcher = HttpFetcher::new(Duration::from_secs(self.http_timeout_secs));
        let builder = PackBuilder::new(&self.output_dir, self.convert_options())
            .with_fetcher(Box::new(fetcher));
        match &self.publish {
            Some(publish) => builder.with_publisher(Box::new(DirectoryPublisher::new(
                &publish.dir,
                publish.base_url.clone(),
            ))),
            None => builder,
        }
    }

    /// Validated requests, in file order.
    pub fn requests(&self) -> Result<Vec<PackRequest>> {
        self.packs.iter().map(PackConfig::request).collect()
    }
}

impl PackConfig {
    pub fn request(&self) -> Result<PackRequest> {
        let pair = LanguagePair::new(&self.source_language, &self.target_language)?;
        let mut request = PackRequest::new(pair, PackSource::parse(&self.source));
        if let Some(pack_id) = &self.pack_id {
            request = request.with_pack_id(pack_id)?;
        }
        request.name = self.name.clone();
        request.reverse_strategy = self.reverse_strategy;
        request.dedup = self.dedup;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
output_dir = "out"
dedup = "preserve-first"

[publish]
dir = "release"
base_url = "https://cdn.test/v2"

[[packs]]
source_language = "FR"
target_language = "en"
source = "sources/fr-en"
name = "French ↔ English"

[[packs]]
source_language = "de"
target_language = "en"
source = "https://example.test/de-en.zip"
reverse_strategy = "html-terms"
"#;

    #[test]
    fn parses_defaults_and_overrides() {
        let config = BatchConfig::from_toml_str(SAMPLE).expect("parse");
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.dedup, DedupPolicy::PreserveFirst);

        let requests = config.requests().expect("requests");
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].pack_id, "fr-en");
        assert_eq!(requests[0].display_name(), "French ↔ English");
        assert_eq!(requests[1].reverse_strategy, Some(ReverseStrategy::HtmlTerms));
        assert_eq!(requests[1].source, PackSource::Url("https://example.test/de-en.zip".into()));
    }

    #[test]
    fn relative_paths_follow_the_config_file() {
        let mut config = BatchConfig::from_toml_str(SAMPLE).expect("parse");
        config.resolve_paths(Path::new("/srv/packs"));
        assert_eq!(config.output_dir, PathBuf::from("/srv/packs/out"));
        assert_eq!(config.packs[0].source, "/srv/packs/sources/fr-en");
        assert_eq!(config.packs[1].source, "https://example.test/de-en.zip");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            BatchConfig::from_toml_str("batch_size = 0"),
            Err(PackError::Config(_))
        ));
        assert!(matches!(BatchConfig::from_toml_str("colour = 1"), Err(PackError::Toml(_))));

        let config = BatchConfig::from_toml_str(
            "[[packs]]\nsource_language = \"french\"\ntarget_language = \"en\"\nsource = \"x\"",
        )
        .expect("parse");
        assert!(matches!(config.requests(), Err(PackError::Config(_))));
    }
}
