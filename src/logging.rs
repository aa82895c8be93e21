use std::{
    env, fs,
    path::PathBuf,
    sync::{Mutex, OnceLock},
};

use anyhow::{Context, Result};

use crate::config::AppConfig;

const LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
static LOG_INSTALLED: OnceLock<()> = OnceLock::new();

/// Log file in the temp dir; stdout belongs to the terminal UI.
pub fn log_file_path() -> PathBuf {
    env::temp_dir().join("silenttalk.log")
}

/// Install the file subscriber when logging is enabled. Returns the log path
/// if one was installed.
pub fn init_logging(config: &AppConfig) -> Result<Option<PathBuf>> {
    if !config.logging_enabled() {
        return Ok(None);
    }
    let path = log_file_path();
    if fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0) > LOG_MAX_BYTES {
        let _ = fs::remove_file(&path);
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed opening log file {}", path.display()))?;

    if LOG_INSTALLED.set(()).is_err() {
        return Ok(Some(path));
    }
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_max_level(config.log_level.as_filter())
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed installing log subscriber: {err}"))?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn disabled_logging_installs_nothing() {
        let config = AppConfig::parse_from(["silenttalk", "--no-logs"]);
        assert_eq!(init_logging(&config).expect("init"), None);
    }

    #[test]
    fn log_path_lives_in_temp_dir() {
        assert!(log_file_path().starts_with(env::temp_dir()));
    }
}
