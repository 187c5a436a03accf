//! Run configuration from `flip.toml` and the command line.
//!
//! ```toml
//! [descent]
//! budget = 200000
//! progress_interval = 5000
//! seed = 42
//! audit = true
//! ```
//!
//! Flags override the file, the file overrides the request's own
//! `flipBudget`, and that overrides the built-in defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use flipgraph::DescentConfig;
use serde::Deserialize;

/// Contents of a config file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// The `[descent]` table.
    #[serde(default)]
    pub descent: DescentOverrides,
}

/// Descent settings that may or may not be given.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DescentOverrides {
    /// Maximum number of flips.
    pub budget: Option<u64>,
    /// Iterations between progress reports; `0` disables them.
    pub progress_interval: Option<u64>,
    /// RNG seed.
    pub seed: Option<u64>,
    /// Audit the index when the run ends.
    pub audit: Option<bool>,
}

impl DescentOverrides {
    /// Takes every field from `self` when set, otherwise from `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            budget: self.budget.or(fallback.budget),
            progress_interval: self.progress_interval.or(fallback.progress_interval),
            seed: self.seed.or(fallback.seed),
            audit: self.audit.or(fallback.audit),
        }
    }

    /// Fills unset fields from [`DescentConfig::default`].
    #[must_use]
    pub fn resolve(&self) -> DescentConfig {
        let defaults = DescentConfig::default();
        DescentConfig {
            budget: self.budget.unwrap_or(defaults.budget),
            progress_interval: self.progress_interval.unwrap_or(defaults.progress_interval),
            seed: self.seed.or(defaults.seed),
            audit: self.audit.unwrap_or(defaults.audit),
        }
    }
}

impl FileConfig {
    /// Parses config text.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed TOML or unknown keys.
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid flipgraph config")
    }

    /// Reads `path`, or returns the empty config when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::parse(&text).with_context(|| format!("in {}", path.display()))?;
        log::debug!("loaded config from {}: {:?}", path.display(), config.descent);
        Ok(config)
    }
}
