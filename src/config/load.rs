use std::fs;
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::paths::ConfigPaths;
use super::types::AppConfig;

const RELAY_URL_ENV: &str = "SEARCH_ASSISTANT_RELAY_URL";
const LISTEN_ENV: &str = "SEARCH_ASSISTANT_LISTEN";

#[derive(Debug)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub paths: ConfigPaths,
    pub config_exists: bool,
}

pub fn load_config(path_override: Option<PathBuf>) -> Result<LoadedConfig, ConfigError> {
    let paths = ConfigPaths::resolve(path_override)?;
    load_from_paths(paths)
}

pub fn load_from_paths(paths: ConfigPaths) -> Result<LoadedConfig, ConfigError> {
    let read = read_config(&paths.config_file)?;
    secure_file_permissions(&paths.config_file)?;
    let mut config = read.config;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(LoadedConfig {
        config,
        paths,
        config_exists: read.exists,
    })
}

fn read_config(path: &Path) -> Result<ConfigRead, ConfigError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(ConfigRead {
            config: toml::from_str(&contents)?,
            exists: true,
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(ConfigRead {
            config: AppConfig::default(),
            exists: false,
        }),
        Err(err) => Err(ConfigError::Io(err)),
    }
}

struct ConfigRead {
    config: AppConfig,
    exists: bool,
}

fn apply_env_overrides(
    config: &mut AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(url) = lookup(RELAY_URL_ENV) {
        if url::Url::parse(&url).is_err() {
            return Err(ConfigError::InvalidOverride {
                key: RELAY_URL_ENV,
                value: url,
            });
        }
        config.client.relay_url = url;
    }
    if let Some(listen) = lookup(LISTEN_ENV) {
        config.relay.listen = listen;
    }
    Ok(())
}

pub(super) fn ensure_dirs(paths: &ConfigPaths) -> Result<(), ConfigError> {
    fs::create_dir_all(&paths.config_dir)?;
    fs::create_dir_all(&paths.data_dir)?;
    Ok(())
}

pub(super) fn secure_file_permissions(path: &Path) -> Result<(), ConfigError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = fs::metadata(path) {
            let mut perms = metadata.permissions();
            let mode = perms.mode() & 0o777;
            if mode & 0o077 != 0 {
                perms.set_mode(0o600);
                fs::set_permissions(path, perms)?;
            }
        }
    }
    Ok(())
}
