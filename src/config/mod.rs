//! TOML configuration shared by the relay server and the terminal host.

mod error;
mod load;
mod paths;
mod save;
mod types;

pub use error::ConfigError;
pub use load::{load_config, LoadedConfig};
pub use paths::ConfigPaths;
pub use save::save_config;
pub use types::{AppConfig, ClientConfig, LoggingConfig, RelayConfig, StorageConfig};
