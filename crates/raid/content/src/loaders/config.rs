//! Raid configuration loader.

use std::path::Path;

use anyhow::Context;
use raid_core::RaidConfig;

use crate::loaders::{LoadResult, read_file};

const BUNDLED: &str = include_str!("../../data/raid.toml");

/// Loader for raid configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate a raid configuration from a TOML file.
    ///
    /// Sections missing from the file take their built-in defaults.
    pub fn load(path: &Path) -> LoadResult<RaidConfig> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("invalid raid config {}", path.display()))
    }

    /// The configuration bundled with the crate.
    pub fn load_default() -> LoadResult<RaidConfig> {
        Self::parse(BUNDLED).context("invalid bundled raid config")
    }

    /// Parse and validate configuration text.
    pub fn parse(content: &str) -> LoadResult<RaidConfig> {
        let config: RaidConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse raid config TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }
}
