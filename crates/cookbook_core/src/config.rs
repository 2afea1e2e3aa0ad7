//! Store configuration.
//!
//! # Responsibility
//! - Describe where the recipe database lives and how live queries buffer.
//! - Resolve configuration from process environment for embedding hosts.
//!
//! # Invariants
//! - The database file name is always `DATABASE_NAME`; only its directory
//!   is configurable.
//! - `subscription_buffer` is never zero.

use crate::db::DATABASE_NAME;
use std::path::PathBuf;

/// Environment variable naming the directory that holds the database file.
pub const DATA_DIR_ENV: &str = "COOKBOOK_DATA_DIR";
/// Environment variable overriding the per-subscription buffer size.
pub const SUBSCRIPTION_BUFFER_ENV: &str = "COOKBOOK_SUBSCRIPTION_BUFFER";

const DEFAULT_SUBSCRIPTION_BUFFER: usize = 16;

/// Open-time settings for `RecipeDatabase`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding the database file.
    pub data_dir: PathBuf,
    /// Use a private in-memory database instead of `data_dir`.
    pub in_memory: bool,
    /// Snapshots buffered per live query before the producer waits.
    pub subscription_buffer: usize,
}

impl StoreConfig {
    /// File-backed config rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            in_memory: false,
            subscription_buffer: DEFAULT_SUBSCRIPTION_BUFFER,
        }
    }

    /// In-memory config, mainly for tests and smoke runs.
    pub fn in_memory() -> Self {
        Self {
            data_dir: PathBuf::new(),
            in_memory: true,
            subscription_buffer: DEFAULT_SUBSCRIPTION_BUFFER,
        }
    }

    /// Resolves config from `COOKBOOK_DATA_DIR` and
    /// `COOKBOOK_SUBSCRIPTION_BUFFER`.
    ///
    /// Falls back to the system temp dir and the default buffer when a
    /// variable is unset, blank or unparsable.
    pub fn from_env() -> Self {
        let data_dir = std::env::var(DATA_DIR_ENV)
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);

        let mut config = Self::new(data_dir);
        if let Some(buffer) = std::env::var(SUBSCRIPTION_BUFFER_ENV)
            .ok()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
        {
            config = config.with_subscription_buffer(buffer);
        }
        config
    }

    /// Overrides the live query buffer, clamping zero to one.
    pub fn with_subscription_buffer(mut self, buffer: usize) -> Self {
        self.subscription_buffer = buffer.max(1);
        self
    }

    /// Full path of the database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_NAME)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::StoreConfig;
    use std::path::Path;

    #[test]
    fn database_path_uses_fixed_name() {
        let config = StoreConfig::new("/data/cookbook");
        assert_eq!(config.database_path(), Path::new("/data/cookbook/Recipes"));
    }

    #[test]
    fn zero_buffer_is_clamped() {
        let config = StoreConfig::in_memory().with_subscription_buffer(0);
        assert_eq!(config.subscription_buffer, 1);
    }
}
