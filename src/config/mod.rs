//! Client configuration — server address and dashboard behavior.
//!
//! User-level config: `~/.reportdeck/config.yaml`.
//! Resolution: `--server` CLI flag → `REPORTDECK_SERVER` env var →
//! config file → default `http://localhost:8080`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_SERVER: &str = "http://localhost:8080";

/// Top-level configuration (user-level file).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Platform server base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// Directory downloaded artifacts are written to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
    /// Looser `/api/runs` contract: allow loading runs with only an app
    /// selected. Off by default; the strict contract matches delete
    /// invalidation.
    #[serde(default)]
    pub release_optional: bool,
}

/// Path to `~/.reportdeck/config.yaml`.
fn user_config_path() -> Option<PathBuf> {
    dirs_path().map(|p| p.join("config.yaml"))
}

/// Path to `~/.reportdeck/`.
fn dirs_path() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|p| PathBuf::from(p).join(".reportdeck"))
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME")
            .ok()
            .map(|p| PathBuf::from(p).join(".reportdeck"))
    }
}

impl Config {
    /// Load config from disk; a missing or unreadable file yields defaults.
    pub fn load() -> Self {
        let Some(path) = user_config_path() else {
            return Self::default();
        };
        Self::load_from(&path)
    }

    fn load_from(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Resolve the server base URL, applying CLI and env overrides.
    pub fn resolve_server(&self, cli_override: Option<&str>) -> Result<Url, url::ParseError> {
        let raw = cli_override
            .map(str::to_string)
            .or_else(|| std::env::var("REPORTDECK_SERVER").ok())
            .or_else(|| self.server.clone())
            .unwrap_or_else(|| DEFAULT_SERVER.into());
        Url::parse(&raw)
    }

    /// Directory for downloaded artifacts, defaulting to the current dir.
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_from_yaml_string() {
        let yaml = r#"
server: http://reports.internal:9090
download_dir: /tmp/reports
release_optional: true
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server, Some("http://reports.internal:9090".into()));
        assert_eq!(config.download_dir, Some(PathBuf::from("/tmp/reports")));
        assert!(config.release_optional);
    }

    #[test]
    fn defaults_when_fields_missing() {
        let config: Config = serde_yaml::from_str("server: http://x").unwrap();
        assert!(!config.release_optional);
        assert_eq!(config.download_dir(), PathBuf::from("."));
    }

    #[test]
    fn load_from_missing_file_is_default() {
        let config = Config::load_from(std::path::Path::new("/nonexistent/config.yaml"));
        assert!(config.server.is_none());
        assert!(!config.release_optional);
    }

    #[test]
    fn load_from_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "server: http://localhost:1234").unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.server, Some("http://localhost:1234".into()));
    }

    #[test]
    fn cli_override_wins() {
        let config = Config {
            server: Some("http://from-file".into()),
            ..Config::default()
        };
        let url = config.resolve_server(Some("http://from-cli")).unwrap();
        assert_eq!(url.as_str(), "http://from-cli/");
    }

    #[test]
    fn file_value_used_without_override() {
        let config = Config {
            server: Some("http://from-file".into()),
            ..Config::default()
        };
        // REPORTDECK_SERVER is assumed unset in the test environment.
        if std::env::var("REPORTDECK_SERVER").is_err() {
            let url = config.resolve_server(None).unwrap();
            assert_eq!(url.as_str(), "http://from-file/");
        }
    }

    #[test]
    fn default_server_when_nothing_configured() {
        if std::env::var("REPORTDECK_SERVER").is_err() {
            let url = Config::default().resolve_server(None).unwrap();
            assert_eq!(url.as_str(), "http://localhost:8080/");
        }
    }

    #[test]
    fn invalid_server_url_errors() {
        let config = Config::default();
        assert!(config.resolve_server(Some("not a url")).is_err());
    }
}
