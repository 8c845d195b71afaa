use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "TASKDUE_DIR";

const APP_DIR: &str = "taskdue";
const LOG_FILE: &str = "taskdue.log";
const DEFAULT_LOG_FILTER: &str = "taskdue=info";

/// Runtime settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the storage slots and the log file.
    pub data_dir: PathBuf,
    /// Cadence of countdown updates in the interactive view.
    pub tick_rate: Duration,
}

impl Config {
    /// Resolves the data directory in the following order:
    /// 1. `TASKDUE_DIR` environment variable.
    /// 2. `~/.local/share/taskdue` (on Linux).
    /// 3. `./taskdue` (fallback).
    pub fn from_env() -> Config {
        let data_dir = resolve_data_dir(std::env::var_os(DATA_DIR_ENV).map(PathBuf::from), dirs::data_local_dir());
        Config::with_data_dir(data_dir)
    }

    pub fn with_data_dir(data_dir: PathBuf) -> Config {
        Config {
            data_dir,
            tick_rate: Duration::from_secs(1),
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }
}

fn resolve_data_dir(overridden: Option<PathBuf>, data_local: Option<PathBuf>) -> PathBuf {
    overridden.unwrap_or_else(|| data_local.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR))
}

/// Installs the global tracing subscriber, writing to the log file in the data directory.
///
/// Logs never go to the terminal, which belongs to the interactive view. If the
/// log file cannot be opened, logging stays disabled.
pub fn init_logging(config: &Config) {
    if fs::create_dir_all(&config.data_dir).is_err() {
        return;
    }
    let file = match OpenOptions::new().create(true).append(true).open(config.log_path()) {
        Ok(f) => f,
        Err(_) => return,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_lives_in_data_dir() {
        let config = Config::with_data_dir(PathBuf::from("/tmp/taskdue-test"));
        assert_eq!(config.log_path(), PathBuf::from("/tmp/taskdue-test/taskdue.log"));
        assert_eq!(config.tick_rate, Duration::from_secs(1));
    }

    #[test]
    fn data_dir_falls_back_to_taskdue_under_cwd() {
        assert_eq!(resolve_data_dir(None, None), PathBuf::from("./taskdue"));
        assert_eq!(
            resolve_data_dir(None, Some(PathBuf::from("/home/u/.local/share"))),
            PathBuf::from("/home/u/.local/share/taskdue")
        );
        assert_eq!(
            resolve_data_dir(Some(PathBuf::from("/srv/tasks")), Some(PathBuf::from("/ignored"))),
            PathBuf::from("/srv/tasks")
        );
    }
}
