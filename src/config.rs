use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TesseraConfig {
    pub logging: LoggingConfig,
    pub embedding: EmbeddingConfig,
    pub clustering: ClusteringConfig,
    pub relations: RelationsConfig,
    pub session: SessionConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub dimension: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClusteringConfig {
    pub similarity_threshold: f64,
    pub keyword_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RelationsConfig {
    pub rebuild_threshold: f64,
    pub prune_threshold: f64,
    pub temporal_window_days: f64,
}

/// Knobs for session warmup selection.
///
/// The high-volume and diversity thresholds are empirical; they are kept here so
/// they can be tuned per deployment.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    pub target_count: usize,
    pub high_volume_threshold: f64,
    pub summary_cluster_threshold: f64,
    pub priority_quota_ratio: f64,
    pub min_priority_quota: usize,
    pub diversity_threshold: f64,
    pub relaxed_diversity_threshold: f64,
    pub importance_weight: f64,
    pub diversity_weight: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub default_limit: usize,
    pub tag_expansion_limit: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: crate::embedding::DEFAULT_DIMENSION,
        }
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.55,
            keyword_limit: 5,
        }
    }
}

impl Default for RelationsConfig {
    fn default() -> Self {
        Self {
            rebuild_threshold: 0.35,
            prune_threshold: 0.15,
            temporal_window_days: 30.0,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target_count: 20,
            high_volume_threshold: 0.75,
            summary_cluster_threshold: 0.7,
            priority_quota_ratio: 0.3,
            min_priority_quota: 3,
            diversity_threshold: 0.3,
            relaxed_diversity_threshold: 0.1,
            importance_weight: 0.7,
            diversity_weight: 0.3,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            tag_expansion_limit: 5,
        }
    }
}

/// Returns `~/.tessera/`, or `./.tessera/` when no home directory is known.
pub fn default_tessera_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".tessera")
}

/// Returns the default config file path: `~/.tessera/config.toml`
pub fn default_config_path() -> PathBuf {
    default_tessera_dir().join("config.toml")
}

impl TesseraConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            TesseraConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (TESSERA_LOG_LEVEL, TESSERA_EMBEDDING_DIM, TESSERA_SESSION_TARGET).
    ///
    /// Numeric overrides that fail to parse are ignored.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TESSERA_LOG_LEVEL") {
            self.logging.log_level = val;
        }
        if let Some(dim) = env_usize("TESSERA_EMBEDDING_DIM") {
            self.embedding.dimension = dim;
        }
        if let Some(target) = env_usize("TESSERA_SESSION_TARGET") {
            self.session.target_count = target;
        }
    }
}

fn env_usize(key: &str) -> Option<usize> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring non-numeric override");
            None
        }
    }
}
