use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::ingest::TripLoadError;

/// Connection and filesystem settings for the graph store. The
/// `import_directory` must be the directory the store's bulk loader
/// resolves `file:///` URLs against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub uri: String,
    pub username: String,
    pub password: String,
    pub import_directory: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: String::from("neo4j://localhost:7687"),
            username: String::from("neo4j"),
            password: String::from("neo4j"),
            import_directory: PathBuf::from("/var/lib/neo4j/import"),
        }
    }
}

impl StoreConfig {
    /// reads the `store` table of a TOML configuration file. missing keys
    /// fall back to the defaults above.
    pub fn from_file(filepath: &Path) -> Result<Self, TripLoadError> {
        let config = Config::builder()
            .add_source(File::from(filepath))
            .build()
            .map_err(|e| {
                let msg = format!("file '{}' produced error: {e}", filepath.display());
                TripLoadError::InvalidUserInput(msg)
            })?;
        config.get::<StoreConfig>("store").map_err(|e| {
            let msg = format!("error reading 'store' key in '{}': {e}", filepath.display());
            TripLoadError::InvalidUserInput(msg)
        })
    }

    /// resolves the configuration from an optional file argument.
    pub fn load(filepath: Option<&Path>) -> Result<Self, TripLoadError> {
        match filepath {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
