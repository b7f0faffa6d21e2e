// config.rs

use crate::error::ConfigError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs::{File, create_dir_all};
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://localhost:3000";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    /// 0 disables the request timeout.
    pub timeout_secs: u64,
    pub reminders: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 10,
            reminders: false,
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "todo-list-view")
}

fn ensure_dir(dir: PathBuf) -> PathBuf {
    create_dir_all(&dir).ok();
    dir
}

pub fn config_path() -> PathBuf {
    let dir = project_dirs()
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    ensure_dir(dir).join("config.json")
}

pub fn log_path() -> PathBuf {
    let dir = project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    ensure_dir(dir).join("todo-list-view.log")
}

/// Reads the config at `path`. A missing file yields `Ok(None)`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Option<Config>, ConfigError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let reader = BufReader::new(file);
    Ok(Some(serde_json::from_reader(reader)?))
}

pub fn save_config<P: AsRef<Path>>(path: P, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.as_ref().parent() {
        create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, cfg)?;
    Ok(())
}

/// Loads the config, writing the defaults out first if there is none yet.
pub fn load_or_init<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    match load_config(&path)? {
        Some(cfg) => Ok(cfg),
        None => {
            let cfg = Config::default();
            save_config(&path, &cfg)?;
            log::info!("wrote default config to {}", path.as_ref().display());
            Ok(cfg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_run_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let cfg = load_or_init(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(load_config(&path).unwrap(), Some(Config::default()));
    }

    #[test]
    fn missing_keys_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_base": "https://todos.example.com/api", "extra": 1}"#)
            .unwrap();
        let cfg = load_or_init(&path).unwrap();
        assert_eq!(cfg.api_base, "https://todos.example.com/api");
        assert_eq!(cfg.timeout_secs, 10);
        assert!(!cfg.reminders);
    }

    #[test]
    fn zero_timeout_means_none() {
        let mut cfg = Config::default();
        assert_eq!(cfg.timeout(), Some(Duration::from_secs(10)));
        cfg.timeout_secs = 0;
        assert_eq!(cfg.timeout(), None);
    }

    #[test]
    fn broken_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Json(_))));
    }
}
