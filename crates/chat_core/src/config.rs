use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::callback::DEFAULT_BYTE_BUDGET;
use crate::paths;

pub const DEFAULT_STACK_LIMIT: usize = 10;
pub const MAX_STACK_LIMIT: usize = 50;
pub const DEFAULT_PAGE_SIZE: usize = 5;
pub const DEFAULT_SESSION_IDLE_MINUTES: u64 = 60;

const CONFIG_FILE_PATH: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Frames kept per user before the oldest is evicted.
    pub stack_limit: usize,
    /// Serialized callback size limit imposed by the transport.
    pub callback_budget: usize,
    /// Directory holding `recipes.json` and `products.json`.
    pub data_dir: PathBuf,
    /// Greeting shown on the main menu.
    pub home_text: String,
    /// Items per page in list screens.
    pub page_size: usize,
    /// Sessions untouched this long are dropped. `0` keeps them forever.
    pub session_idle_minutes: u64,
    pub debug: bool,
    /// Default tracing filter when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stack_limit: DEFAULT_STACK_LIMIT,
            callback_budget: DEFAULT_BYTE_BUDGET,
            data_dir: PathBuf::from("data"),
            home_text: "🍽 Main menu\n\nChoose a section:".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            session_idle_minutes: DEFAULT_SESSION_IDLE_MINUTES,
            debug: false,
            log_level: "info".to_string(),
        }
    }
}

pub(crate) fn parse_bool_env(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

impl Config {
    /// Defaults, then `~/.eatbot/config.json` or `./config.toml`, then environment.
    /// How long an untouched session is kept, if it expires at all.
    pub fn session_idle_timeout(&self) -> Option<std::time::Duration> {
        (self.session_idle_minutes > 0)
            .then(|| std::time::Duration::from_secs(self.session_idle_minutes * 60))
    }

    pub fn load() -> Self {
        let mut config = Self::from_files(&paths::config_json_path(), Path::new(CONFIG_FILE_PATH))
            .unwrap_or_default();
        config.apply_env(|key| std::env::var(key).ok());
        config.normalize();
        config
    }

    fn from_files(json_path: &Path, toml_path: &Path) -> Option<Self> {
        if json_path.exists() {
            match paths::load_config_json::<Config>(json_path) {
                Ok(config) => return Some(config),
                Err(e) => tracing::warn!("ignoring config: {}", e),
            }
        }

        if toml_path.exists() {
            match load_config_toml(toml_path) {
                Ok(config) => return Some(config),
                Err(e) => tracing::warn!("ignoring config: {}", e),
            }
        }

        None
    }

    /// Overlay `clap`-style overrides; `None` keeps the current value.
    pub fn with_overrides(
        mut self,
        data_dir: Option<PathBuf>,
        stack_limit: Option<usize>,
        page_size: Option<usize>,
    ) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        if let Some(limit) = stack_limit {
            self.stack_limit = limit;
        }
        if let Some(size) = page_size {
            self.page_size = size;
        }
        self.normalize();
        self
    }

    fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(limit) = var("EATBOT_STACK_LIMIT").and_then(|v| v.trim().parse().ok()) {
            self.stack_limit = limit;
        }
        if let Some(budget) = var("EATBOT_CALLBACK_BUDGET").and_then(|v| v.trim().parse().ok()) {
            self.callback_budget = budget;
        }
        if let Some(dir) = var("EATBOT_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(text) = var("EATBOT_HOME_TEXT") {
            self.home_text = text;
        }
        if let Some(size) = var("EATBOT_PAGE_SIZE").and_then(|v| v.trim().parse().ok()) {
            self.page_size = size;
        }
        if let Some(minutes) = var("EATBOT_SESSION_IDLE_MINUTES").and_then(|v| v.trim().parse().ok()) {
            self.session_idle_minutes = minutes;
        }
        if let Some(debug) = var("EATBOT_DEBUG") {
            self.debug = parse_bool_env(&debug);
        }
    }

    fn normalize(&mut self) {
        self.stack_limit = self.stack_limit.clamp(1, MAX_STACK_LIMIT);
        self.page_size = self.page_size.max(1);
        if self.callback_budget == 0 {
            self.callback_budget = DEFAULT_BYTE_BUDGET;
        }
    }
}

fn load_config_toml(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn parse_bool_env_true_values() {
        for value in ["1", "true", "TRUE", " yes ", "Y", "on"] {
            assert!(parse_bool_env(value), "value {value:?} should be true");
        }
    }

    #[test]
    fn parse_bool_env_false_values() {
        for value in ["0", "false", "no", "off", "", "  "] {
            assert!(!parse_bool_env(value), "value {value:?} should be false");
        }
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            ("EATBOT_STACK_LIMIT", "12"),
            ("EATBOT_DATA_DIR", "/tmp/eatbot"),
            ("EATBOT_DEBUG", "yes"),
            ("EATBOT_PAGE_SIZE", "not-a-number"),
            ("EATBOT_SESSION_IDLE_MINUTES", "0"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.stack_limit, 12);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/eatbot"));
        assert!(config.debug);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.session_idle_minutes, 0);
    }

    #[test]
    fn normalize_clamps_limits() {
        let mut config = Config {
            stack_limit: 0,
            page_size: 0,
            callback_budget: 0,
            ..Config::default()
        };
        config.normalize();
        assert_eq!(config.stack_limit, 1);
        assert_eq!(config.page_size, 1);
        assert_eq!(config.callback_budget, DEFAULT_BYTE_BUDGET);

        config.stack_limit = 500;
        config.normalize();
        assert_eq!(config.stack_limit, MAX_STACK_LIMIT);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("config.toml");
        std::fs::write(&toml_path, "stack_limit = 15\n").unwrap();

        let config = Config::from_files(&dir.path().join("missing.json"), &toml_path).unwrap();
        assert_eq!(config.stack_limit, 15);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn broken_toml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("config.toml");
        std::fs::write(&toml_path, "stack_limit = [").unwrap();

        let err = load_config_toml(&toml_path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(Config::from_files(&dir.path().join("missing.json"), &toml_path).is_none());
    }

    #[test]
    fn overrides_are_normalized() {
        let config = Config::default().with_overrides(Some(PathBuf::from("/srv")), Some(0), None);
        assert_eq!(config.data_dir, PathBuf::from("/srv"));
        assert_eq!(config.stack_limit, 1);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn json_takes_precedence_over_toml() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("config.json");
        let toml_path = dir.path().join("config.toml");
        std::fs::write(&json_path, r#"{"page_size": 8}"#).unwrap();
        std::fs::write(&toml_path, "page_size = 3\n").unwrap();

        let config = Config::from_files(&json_path, &toml_path).unwrap();
        assert_eq!(config.page_size, 8);
    }
}
