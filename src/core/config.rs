//! `scent.yaml` configuration

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::search::embedding::{HtpEncoder, DEFAULT_DIMENSION};

pub const CONFIG_FILE: &str = "scent.yaml";

/// Scents indexed when the config does not list any
pub const DEFAULT_SCENTS: [&str; 5] = [
    "lavender floral soft soothing",
    "lemongrass fresh grassy lemon herbal",
    "orange fresh citrus tangy sweet",
    "raspberry berry earthy herbal fresh",
    "garlic pungent wasabi spicy",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScentConfig {
    /// HTP embedding dimension
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Results per query when `-k` is not given
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Upper bound for k on the MCP surface
    #[serde(default = "default_max_k")]
    pub max_k: usize,

    #[serde(default = "default_scents")]
    pub scents: Vec<String>,
}

fn default_dimension() -> usize {
    DEFAULT_DIMENSION
}

fn default_k() -> usize {
    1
}

fn default_max_k() -> usize {
    100
}

fn default_scents() -> Vec<String> {
    DEFAULT_SCENTS.iter().map(|s| s.to_string()).collect()
}

impl Default for ScentConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            default_k: default_k(),
            max_k: default_max_k(),
            scents: default_scents(),
        }
    }
}

impl ScentConfig {
    /// `scent.yaml` in the current directory
    pub fn default_path() -> PathBuf {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(CONFIG_FILE)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("Invalid scent config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("In {}", path.display()))
    }

    /// Load from `path` or the default location
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Self::load(&Self::default_path()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_yaml()?)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_k == 0 || self.max_k == 0 {
            anyhow::bail!("default_k and max_k must be at least 1");
        }
        if self.default_k > self.max_k {
            anyhow::bail!(
                "default_k ({}) exceeds max_k ({})",
                self.default_k,
                self.max_k
            );
        }
        self.encoder()?;
        Ok(())
    }

    /// Encoder described by this config
    pub fn encoder(&self) -> Result<HtpEncoder> {
        Ok(HtpEncoder::with_dimension(self.dimension)?)
    }

    /// Clamp a requested k into `1..=max_k`; 0 means "use default_k"
    pub fn clamp_k(&self, requested: usize) -> usize {
        if requested == 0 {
            self.default_k
        } else {
            requested.min(self.max_k)
        }
    }
}
