use std::path::{Path, PathBuf};

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming};

use search_assistant::config::LoggingConfig;

/// Starts logging to a rotating file at `logging.path`. Without a path the
/// log goes to `search-assistant.log` under `default_dir`, or to stderr
/// when there is no default directory either.
///
/// The returned handle has to stay alive for file output to be flushed.
pub fn init_logging(
    config: &LoggingConfig,
    level_override: Option<&str>,
    default_dir: Option<&Path>,
) -> anyhow::Result<LoggerHandle> {
    let level = level_override.unwrap_or(&config.level);
    let logger = Logger::try_with_env_or_str(level)?;

    let path = match (config.path.as_ref(), default_dir) {
        (Some(path), _) => PathBuf::from(path),
        (None, Some(dir)) => dir.join("search-assistant.log"),
        (None, None) => return Ok(logger.log_to_stderr().start()?),
    };
    let directory = path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let basename = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("search-assistant")
        .to_string();
    let handle = logger
        .log_to_file(FileSpec::default().directory(directory).basename(basename))
        .rotate(
            Criterion::Size(config.rotate_size),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config.rotate_keep),
        )
        .start()?;
    Ok(handle)
}
