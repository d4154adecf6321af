//! Configuration loading from TOML files

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use octavo_model::mapping::{BuiltinSource, FileSource, HttpSource};
use octavo_model::{MappingCache, StaticTaxonomy};

/// Global configuration for octavo
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub index: IndexConfig,
    pub stream: StreamConfig,
    pub mapping: MappingConfig,
    pub taxonomy: TaxonomyConfig,
    pub workers: WorkersConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// json-lines fixture/store file with one bib per line
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/bibs.ndjson"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub dir: PathBuf,
    /// Index name; supports ${VAR} so deploys can point at dated indices
    #[serde(deserialize_with = "deserialize_env_var")]
    pub name: Option<String>,
}

impl IndexConfig {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("resources")
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./data/index"),
            name: Some("resources".to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Disable downstream notification entirely
    pub enabled: bool,
    pub path: PathBuf,
    pub name: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("./data/processed.ndjson"),
            name: "IndexDocumentProcessed".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// builtin | file | http
    pub source: String,
    /// directory containing field-mapping-<type>.json (source = "file")
    pub dir: Option<PathBuf>,
    /// base url serving field-mapping-<type>.json (source = "http")
    pub base_url: Option<String>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            source: "builtin".to_string(),
            dir: None,
            base_url: None,
        }
    }
}

impl MappingConfig {
    pub fn build_cache(&self) -> Result<MappingCache> {
        match self.source.as_str() {
            "builtin" => Ok(MappingCache::new(Box::new(BuiltinSource))),
            "file" => {
                let dir = self
                    .dir
                    .as_ref()
                    .context("mapping.source = \"file\" requires mapping.dir")?;
                Ok(MappingCache::new(Box::new(FileSource::new(dir))))
            }
            "http" => {
                let base_url = self
                    .base_url
                    .as_ref()
                    .context("mapping.source = \"http\" requires mapping.base_url")?;
                Ok(MappingCache::new(Box::new(HttpSource::new(base_url))))
            }
            other => anyhow::bail!("unrecognized mapping source: {other}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TaxonomyConfig {
    /// Optional catalog-item-type table override
    pub path: Option<PathBuf>,
}

impl TaxonomyConfig {
    pub fn build(&self) -> Result<StaticTaxonomy> {
        match &self.path {
            Some(path) => StaticTaxonomy::from_file(path)
                .with_context(|| format!("loading taxonomy from {}", path.display())),
            None => Ok(StaticTaxonomy::builtin()),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WorkersConfig {
    /// Ranges to partition a reindex into
    pub default: usize,
    /// Simultaneously active ceiling
    pub concurrency: usize,
    /// Seconds between range starts
    pub stagger_secs: u64,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            default: 15,
            concurrency: 3,
            stagger_secs: 20,
        }
    }
}

/// Deserialize a string that may contain an environment variable
/// reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./octavo.toml (current directory)
    /// 2. ~/.config/octavo/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("octavo.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "octavo") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
