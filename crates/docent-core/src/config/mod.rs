mod env;
mod types;

#[cfg(test)]
mod tests;

pub use types::*;

use std::path::Path;

use anyhow::Context;

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error when the chunking parameters are unusable.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.ingestion.chunk_size > 0, "chunk_size must be positive");
        anyhow::ensure!(
            self.ingestion.chunk_overlap < self.ingestion.chunk_size,
            "chunk_overlap must be smaller than chunk_size"
        );
        Ok(())
    }
}
