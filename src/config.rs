// File: src/config.rs
// Application configuration: TOML file with per-field defaults, overridden from the command line

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default)]
    pub rpc_user: Option<String>,
    #[serde(default)]
    pub rpc_password: Option<String>,
    /// When set, blocks are served from this JSON snapshot instead of a node
    #[serde(default)]
    pub fixture: Option<PathBuf>,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors: bool,
    /// Number of most recent blocks the leaderboard scans
    #[serde(default = "default_score_depth")]
    pub score_depth: u64,
    /// Show timestamps in UTC instead of the host's local zone
    #[serde(default)]
    pub utc_timestamps: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            rpc_user: None,
            rpc_password: None,
            fixture: None,
            bind: default_bind(),
            port: default_port(),
            cors: false,
            score_depth: default_score_depth(),
            utc_timestamps: false,
        }
    }
}

impl Config {
    /// Defaults when no file is given; a given file must exist and parse
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                Self::parse(&content)
                    .with_context(|| format!("Invalid config file {}", path.display()))
            }
            None => Ok(Config::default()),
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn rpc_auth(&self) -> Option<(String, String)> {
        self.rpc_user
            .clone()
            .map(|user| (user, self.rpc_password.clone().unwrap_or_default()))
    }
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8332".to_string()
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_score_depth() -> u64 {
    144
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::parse(
            r#"
            rpc_url = "http://node:18332"
            rpc_user = "explorer"
            score_depth = 500
            utc_timestamps = true
            "#,
        )
        .unwrap();

        assert_eq!(config.rpc_url, "http://node:18332");
        assert_eq!(config.score_depth, 500);
        assert!(config.utc_timestamps);
        assert_eq!(config.port, 8080);
        assert_eq!(config.rpc_auth(), Some(("explorer".to_string(), String::new())));
    }

    #[test]
    fn no_user_means_no_auth() {
        let config = Config {
            rpc_password: Some("secret".to_string()),
            ..Config::default()
        };
        assert_eq!(config.rpc_auth(), None);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(Config::parse("port = \"eighty\"").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/explorer.toml"))).is_err());
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }
}
