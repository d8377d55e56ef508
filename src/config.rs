//! Collector configuration model and file-backed loader.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::sink::{Fault, FaultKind, FaultSink};

pub const CONFIG_PATH_ENV: &str = "ROBILYTICS_CONFIG";
pub const STORE_PATH_ENV: &str = "ROBILYTICS_STORE";
const DEFAULT_CONFIG_PATH: &str = "config.json";
const STORE_FILE_NAME: &str = "robilytics.redb";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Team {
    pub name: String,
    pub members: Vec<String>,
}

/// Remote endpoint, credentials and the teams/projects to report on.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Base of the REST API, e.g. `https://jira.example.com/rest/api/2/`.
    pub url: String,
    pub username: String,
    pub password: String,
    pub teams: Vec<Team>,
    pub projects: Vec<String>,
}

impl Config {
    /// Every configured developer once, in order of first appearance.
    pub fn developers(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.teams
            .iter()
            .flat_map(|team| team.members.iter().map(String::as_str))
            .filter(|developer| seen.insert(*developer))
            .collect()
    }

    pub fn developer_count(&self) -> usize {
        self.developers().len()
    }

    pub fn jira(&self) -> jira_api::JiraConfig {
        jira_api::JiraConfig::new(&self.url, &self.username, &self.password)
    }
}

/// Loads the JSON configuration file.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses `ROBILYTICS_CONFIG` when set, otherwise `config.json` in the working directory.
    pub fn from_env() -> Self {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Reads the config, reporting failures and falling back to an empty config.
    pub fn load(&self, sink: &dyn FaultSink) -> Config {
        match self.read() {
            Ok(config) => config,
            Err(err) => {
                sink.report(Fault::new(
                    FaultKind::Config,
                    "could not load configuration",
                    err,
                ));
                Config::default()
            }
        }
    }
}

/// Location of the durable store: `ROBILYTICS_STORE`, else the platform data
/// directory, else the working directory.
pub fn store_path() -> PathBuf {
    if let Some(path) = std::env::var_os(STORE_PATH_ENV) {
        return PathBuf::from(path);
    }
    directories::ProjectDirs::from("io", "robilytics", "robilytics")
        .map(|dirs| dirs.data_dir().join(STORE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(STORE_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::{Config, ConfigManager, Team};
    use crate::sink::{FaultKind, MemorySink};
    use std::env;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        env::temp_dir().join(format!("robilytics-tests-{name}-{nanos}/config.json"))
    }

    fn write(path: &PathBuf, content: &str) {
        fs::create_dir_all(path.parent().expect("parent must exist")).expect("create temp dir");
        fs::write(path, content).expect("write config");
    }

    #[test]
    fn loads_full_config() {
        let path = unique_path("full");
        write(
            &path,
            r#"{
                "url": "https://jira.example.com/rest/api/2/",
                "username": "bot",
                "password": "hunter2",
                "teams": [
                    {"name": "core", "members": ["jdoe", "asmith"]},
                    {"name": "web", "members": ["bkim"]}
                ],
                "projects": ["CORE", "WEB"]
            }"#,
        );

        let sink = MemorySink::new();
        let config = ConfigManager::new(&path).load(&sink);

        assert!(sink.snapshot().is_empty());
        assert_eq!(config.url, "https://jira.example.com/rest/api/2/");
        assert_eq!(config.teams.len(), 2);
        assert_eq!(config.projects, vec!["CORE", "WEB"]);
        assert_eq!(config.developers(), vec!["jdoe", "asmith", "bkim"]);
        assert_eq!(config.developer_count(), 3);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn developers_in_several_teams_are_listed_once() {
        let config = Config {
            teams: vec![
                Team {
                    name: "core".into(),
                    members: vec!["jdoe".into(), "asmith".into()],
                },
                Team {
                    name: "web".into(),
                    members: vec!["bkim".into(), "jdoe".into(), "bkim".into()],
                },
            ],
            ..Config::default()
        };
        assert_eq!(config.developers(), vec!["jdoe", "asmith", "bkim"]);
        assert_eq!(config.developer_count(), 3);
    }

    #[test]
    fn missing_fields_default() {
        let path = unique_path("partial");
        write(&path, r#"{"url": "https://jira", "teams": [{"name": "solo"}]}"#);

        let config = ConfigManager::new(&path).load(&MemorySink::new());
        assert_eq!(config.username, "");
        assert_eq!(
            config.teams,
            vec![Team {
                name: "solo".to_string(),
                members: vec![]
            }]
        );
        assert!(config.projects.is_empty());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_reports_and_returns_default() {
        let sink = MemorySink::new();
        let config = ConfigManager::new(unique_path("missing")).load(&sink);
        assert_eq!(config, Config::default());
        assert_eq!(sink.count(FaultKind::Config), 1);
    }

    #[test]
    fn invalid_json_reports_and_returns_default() {
        let path = unique_path("invalid");
        write(&path, "not-valid-json");

        let sink = MemorySink::new();
        let config = ConfigManager::new(&path).load(&sink);
        assert_eq!(config, Config::default());
        assert_eq!(sink.count(FaultKind::Config), 1);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
