use std::path::PathBuf;

use super::error::ConfigError;

const APP_DIR: &str = "search-assistant";

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_file: PathBuf,
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub logs_dir: PathBuf,
}

impl ConfigPaths {
    pub fn resolve(config_override: Option<PathBuf>) -> Result<Self, ConfigError> {
        if let Some(path) = config_override {
            let dir = path
                .parent()
                .map(PathBuf::from)
                .ok_or(ConfigError::MissingHome)?;
            let data_dir = default_data_dir().unwrap_or_else(|_| dir.join("data"));
            return Ok(Self::from_dirs(dir, data_dir, path));
        }
        let config_dir = default_config_dir()?;
        let config_file = config_dir.join("config.toml");
        Ok(Self::from_dirs(config_dir, default_data_dir()?, config_file))
    }

    /// Keeps every path under one root, used by tests and portable installs.
    pub fn rooted(root: PathBuf) -> Self {
        Self::from_dirs(root.clone(), root.join("data"), root.join("config.toml"))
    }

    fn from_dirs(config_dir: PathBuf, data_dir: PathBuf, config_file: PathBuf) -> Self {
        let logs_dir = data_dir.join("logs");
        Self {
            config_file,
            config_dir,
            data_dir,
            logs_dir,
        }
    }

    /// Directory holding the JSON storage areas (settings and chat history).
    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir.join("storage")
    }
}

fn default_config_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::MissingHome)?;
    Ok(home.join(".config").join(APP_DIR))
}

fn default_data_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or(ConfigError::MissingHome)
}
