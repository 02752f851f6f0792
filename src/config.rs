use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::Deserialize;

use crate::errors::{MetadateError, Result};

#[derive(Deserialize, Default, Debug)]
#[serde(default)]
pub struct Defaults {
    pub extension: Option<String>,
    pub recursive: bool,
}

#[derive(Deserialize, Debug)]
pub struct Log {
    #[serde(default = "default_level")]
    pub level: LogLevel,
    #[serde(default = "default_log_to_console")]
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone, Debug, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn default_level() -> LogLevel {
    LogLevel::Info
}

fn default_log_to_console() -> bool {
    true
}

#[derive(Deserialize, Default, Debug)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    pub log: Option<Log>,
}

fn parse_path(path: PathBuf) -> PathBuf {
    let Some(str_path) = path.to_str() else {
        return path;
    };
    if !str_path.starts_with("${exe_dir}") {
        return path;
    }

    let exe_dir = env::current_exe().ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    match exe_dir {
        Some(exe_dir) => PathBuf::from(str_path.replace("${exe_dir}", &exe_dir.to_string_lossy())),
        None => path,
    }
}

pub fn parse_config(cfg_content: &str) -> Result<Config> {
    let mut cfg: Config = toml::from_str::<Config>(cfg_content)
        .map_err(|e| MetadateError::Config(format!("Error parsing configuration file: {}", e)))?;

    if let Some(ref mut log) = cfg.log {
        log.location = log.location.take().map(parse_path);
    }

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> Result<Config> {
    let cfg_content = fs::read_to_string(cfg_path)
        .map_err(|e| MetadateError::Config(format!("Error opening configuration file {}: {}", cfg_path.display(), e)))?;

    parse_config(&cfg_content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let toml_str = r##"
[defaults]
extension = ".md"
recursive = true

[log]
level = "Debug"
log_to_console = false
location = "/var/log/metadate.log"
"##;
        let cfg = parse_config(toml_str).unwrap();
        assert_eq!(cfg.defaults.extension.as_deref(), Some(".md"));
        assert!(cfg.defaults.recursive);
        let log = cfg.log.unwrap();
        assert_eq!(log.level, LogLevel::Debug);
        assert!(!log.log_to_console);
        assert_eq!(log.location, Some(PathBuf::from("/var/log/metadate.log")));
    }

    #[test]
    fn test_empty_config() {
        let cfg = parse_config("").unwrap();
        assert!(cfg.defaults.extension.is_none());
        assert!(!cfg.defaults.recursive);
        assert!(cfg.log.is_none());
    }

    #[test]
    fn test_log_defaults() {
        let cfg = parse_config("[log]\n").unwrap();
        let log = cfg.log.unwrap();
        assert_eq!(log.level, LogLevel::Info);
        assert!(log.log_to_console);
        assert!(log.location.is_none());
    }

    #[test]
    fn test_exe_dir_expansion() {
        let cfg = parse_config("[log]\nlocation = \"${exe_dir}/metadate.log\"\n").unwrap();
        let location = cfg.log.unwrap().location.unwrap();
        assert!(!location.to_string_lossy().contains("${exe_dir}"));
        assert!(location.ends_with("metadate.log"));
    }

    #[test]
    fn test_invalid_config() {
        let res = parse_config("[defaults]\nrecursive = \"yes\"\n");
        assert!(matches!(res, Err(MetadateError::Config(_))));
        let res = read_config(Path::new("does/not/exist.toml"));
        assert!(matches!(res, Err(MetadateError::Config(_))));
    }
}
