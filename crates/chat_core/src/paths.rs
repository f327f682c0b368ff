use std::path::{Path, PathBuf};

use crate::config::ConfigError;

/// Per-user application directory (~/.eatbot)
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".eatbot")
}

/// Path of the optional JSON configuration file
pub fn config_json_path() -> PathBuf {
    app_dir().join("config.json")
}

/// Load a JSON file into `T`
pub fn load_config_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
