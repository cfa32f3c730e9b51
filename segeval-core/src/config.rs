//! Configuration for the evaluator.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! explicit config file -> environment -> overrides. The user config lives at
//! `~/.config/segeval/config.toml` (platform equivalent via `directories`).

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EvalError, Result};

/// Top-level evaluator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Also return the per-cluster VOI decomposition.
    #[serde(default)]
    pub return_cluster_scores: bool,
    /// Parallel aggregation settings.
    #[serde(default)]
    pub parallel: ParallelConfig,
}

/// When and how the contingency pass is split across the rayon pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Allow the parallel aggregation path.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Minimum number of positions before the parallel path is taken.
    #[serde(default = "default_min_len")]
    pub min_len: usize,
    /// Number of positions aggregated per task.
    #[serde(default = "default_chunk_len")]
    pub chunk_len: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_len: default_min_len(),
            chunk_len: default_chunk_len(),
        }
    }
}

impl ParallelConfig {
    /// Sequential-only settings.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_len == 0 {
            return Err(EvalError::invalid_config("parallel.chunk_len must be > 0"));
        }
        Ok(())
    }

    /// Whether an input of `len` positions should take the parallel path.
    pub fn should_parallelize(&self, len: usize) -> bool {
        self.enabled && len >= self.min_len && len > self.chunk_len
    }
}

impl EvalConfig {
    pub fn with_cluster_scores(mut self, enabled: bool) -> Self {
        self.return_cluster_scores = enabled;
        self
    }

    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.parallel.validate()
    }
}

fn default_true() -> bool {
    true
}

fn default_min_len() -> usize {
    1 << 20
}

fn default_chunk_len() -> usize {
    1 << 18
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `SEGEVAL_`, `__` for nesting)
/// 3. Explicit config file
/// 4. User config (`~/.config/segeval/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    config_file: Option<&Path>,
    overrides: Option<&EvalConfig>,
) -> Result<EvalConfig> {
    let mut figment = Figment::from(Serialized::defaults(EvalConfig::default()));

    if let Some(dirs) = directories::ProjectDirs::from("dev", "segeval", "segeval") {
        let user_config = dirs.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(path) = config_file {
        figment = figment.merge(Toml::file(path));
    }

    // SEGEVAL_RETURN_CLUSTER_SCORES, SEGEVAL_PARALLEL__CHUNK_LEN, etc.
    figment = figment.merge(Env::prefixed("SEGEVAL_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    let config: EvalConfig = figment.extract().map_err(Box::new)?;
    config.validate()?;
    Ok(config)
}
