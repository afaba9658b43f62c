use crate::errors::{MetaError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Longest super-type chain followed before a lookup gives up
    #[serde(default = "default_max_depth")]
    pub max_ancestor_depth: usize,

    #[serde(default)]
    pub duplicates: DuplicateConfig,

    #[serde(default)]
    pub prefetch: PrefetchConfig,
}

/// What to do when the host reports two members with the same name on one type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    #[default]
    LastWins,
    FirstWins,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateConfig {
    #[serde(default)]
    pub policy: DuplicatePolicy,

    #[serde(default = "default_true")]
    pub warn: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PrefetchConfig {
    /// Worker threads for `prefetch` (0 = rayon's global pool)
    #[serde(default)]
    pub threads: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_ancestor_depth: default_max_depth(),
            duplicates: DuplicateConfig::default(),
            prefetch: PrefetchConfig::default(),
        }
    }
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            policy: DuplicatePolicy::LastWins,
            warn: true,
        }
    }
}

fn default_true() -> bool { true }
fn default_max_depth() -> usize { 256 }

impl CacheConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| MetaError::Config {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| MetaError::Config {
            message: format!("failed to parse config: {}", e),
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| MetaError::Config {
            message: format!("failed to serialize config: {}", e),
        })
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates.policy = policy;
        self
    }

    pub fn with_max_ancestor_depth(mut self, depth: usize) -> Self {
        self.max_ancestor_depth = depth;
        self
    }
}
