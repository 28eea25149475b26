//! Run configuration, read from an optional TOML file.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration.

use crate::error::*;
use crate::assembler::{Assembler, UltimatePolicy};
use crate::data_structs::DamageType;
use crate::extractors::Patterns;
use crate::fallback::FallbackTable;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde_derive::Deserialize;
use log::info;

/// Hero names that mark example or template data.
pub const DEFAULT_SENTINELS: &[&str] = &["hero_abilities_example", "example_hero"];

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScraperConfig {
    pub http: HttpConfig,
    pub paths: PathsConfig,
    pub extraction: ExtractionConfig,
    pub assets: AssetsConfig
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Retries after the first attempt.
    pub retries: usize,
    pub min_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub opendota_base: String,
    pub liquipedia_base: String
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".into(),
            timeout_secs: 30,
            retries: 5,
            min_backoff_ms: 1000,
            max_backoff_ms: 30_000,
            opendota_base: "https://api.opendota.com/api".into(),
            liquipedia_base: "https://liquipedia.net/dota2".into()
        }
    }
}

impl HttpConfig {
    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Holds `data/heroes.json` and `data/hero_mapping.json`.
    pub resources_dir: PathBuf,
    pub abilities_dir: PathBuf,
    pub matches_dir: PathBuf,
    pub html_dir: PathBuf,
    pub images_dir: PathBuf
}

impl Default for PathsConfig {
    fn default() -> Self {
        let resources = PathBuf::from("src/main/resources");

        PathsConfig {
            abilities_dir: resources.join("data/abilities"),
            matches_dir: PathBuf::from("data/matches"),
            html_dir: PathBuf::from("hero_pages"),
            images_dir: resources.join("images/heroes"),
            resources_dir: resources
        }
    }
}

impl PathsConfig {
    pub fn heroes_file(&self) -> PathBuf {
        self.resources_dir.join("data/heroes.json")
    }

    pub fn hero_mapping_file(&self) -> PathBuf {
        self.resources_dir.join("data/hero_mapping.json")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionConfig {
    pub ultimate_policy: UltimatePolicy,
    /// Used when neither the page nor the fallback table names a damage type.
    pub default_damage_type: DamageType,
    pub sentinels: Vec<String>,
    /// Replaces the compiled-in fallback table.
    pub fallback_table: Option<PathBuf>,
    /// Replaces the compiled-in extractor patterns.
    pub patterns: Option<PathBuf>
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            ultimate_policy: UltimatePolicy::default(),
            default_damage_type: DamageType::None,
            sentinels: DEFAULT_SENTINELS.iter().map(|s| s.to_string()).collect(),
            fallback_table: None,
            patterns: None
        }
    }
}

impl ExtractionConfig {
    /// An assembler using the configured tables and policies.
    pub fn assembler(&self) -> Result<Assembler> {
        let patterns = match &self.patterns {
            Some(path) => {
                info!("Using extractor patterns from {}", path.display());
                Patterns::from_toml(&fs::read_to_string(path)?)?
            },
            None => Patterns::builtin()?
        };

        Ok(Assembler {
            patterns,
            fallbacks: FallbackTable::builtin_or(self.fallback_table.as_ref())?,
            policy: self.ultimate_policy,
            default_damage: self.default_damage_type
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    pub workers: usize,
    pub request_delay_ms: u64
}

impl Default for AssetsConfig {
    fn default() -> Self {
        AssetsConfig {
            workers: 3,
            request_delay_ms: 500
        }
    }
}

impl ScraperConfig {
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: ScraperConfig = ::toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .chain_err(|| format!("could not read config {}", path.display()))?;

        info!("Loaded config from {}", path.display());
        Self::from_toml(&contents)
    }

    /// The file at `path`, or the defaults when no path is given.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.assets.workers == 0 {
            bail!(ErrorKind::InvalidConfig("assets.workers must be at least 1".into()));
        }

        if self.http.min_backoff_ms > self.http.max_backoff_ms {
            bail!(ErrorKind::InvalidConfig("http.min_backoff_ms exceeds http.max_backoff_ms".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = ScraperConfig::from_toml("").unwrap();

        assert_eq!(config, ScraperConfig::default());
        assert_eq!(config.assets.workers, 3);
        assert_eq!(config.extraction.ultimate_policy, UltimatePolicy::Either);
        assert_eq!(config.paths.heroes_file(), PathBuf::from("src/main/resources/data/heroes.json"));
    }

    #[test]
    fn sections_override_defaults() {
        let config = ScraperConfig::from_toml(r#"
            [http]
            retries = 2

            [extraction]
            ultimate_policy = "three-values"
            default_damage_type = "physical"

            [paths]
            abilities_dir = "out/abilities"
        "#).unwrap();

        assert_eq!(config.http.retries, 2);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.extraction.ultimate_policy, UltimatePolicy::ThreeValues);
        assert_eq!(config.extraction.default_damage_type, DamageType::Physical);
        assert_eq!(config.paths.abilities_dir, PathBuf::from("out/abilities"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ScraperConfig::from_toml("[assets]\nworkers = 0").is_err());
        assert!(ScraperConfig::from_toml("[http]\nmin_backoff_ms = 10\nmax_backoff_ms = 1").is_err());
        assert!(ScraperConfig::from_toml("[http]\nretrys = 2").is_err());
    }

    #[test]
    fn assembler_follows_config() {
        let mut extraction = ExtractionConfig::default();
        extraction.default_damage_type = DamageType::Physical;
        let assembler = extraction.assembler().unwrap();

        assert_eq!(assembler.default_damage, DamageType::Physical);
        assert!(assembler.fallbacks.ability("axe", "Culling Blade").is_some());
    }
}
