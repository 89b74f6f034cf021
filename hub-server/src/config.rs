//! Configuration module

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use xql_hub_core::constants::{
    ALLOWED_BRANCHES, DEFAULT_CONTENT_DIR, DEFAULT_GIT_REMOTE, DEFAULT_MITRE_DATA_PATH,
    DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_PULL_TIMEOUT_SECS, DEFAULT_RELOAD_TIMEOUT_SECS,
    MAX_DOCUMENT_BYTES,
};
use xql_hub_core::{DataPaths, GitSourceConfig, LoaderOptions, RefreshConfig, WebhookSecret};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Directory holding the YAML documents
    pub content_dir: PathBuf,

    /// Scan sub-directories of `content_dir`
    pub content_recursive: bool,

    /// ATT&CK snapshot file
    pub mitre_data_path: PathBuf,

    /// Git working copy the content lives in
    pub repo_dir: PathBuf,

    /// Remote name to verify and pull from
    pub git_remote: String,

    /// Webhook shared secret; unset rejects every trigger
    pub webhook_secret: Option<WebhookSecret>,

    /// Expected remote URL; unset skips the identity check
    pub expected_repo_url: Option<String>,

    pub probe_timeout: Duration,
    pub pull_timeout: Duration,
    pub reload_timeout: Duration,

    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            environment: "development".to_string(),
            content_dir: PathBuf::from(DEFAULT_CONTENT_DIR),
            content_recursive: false,
            mitre_data_path: PathBuf::from(DEFAULT_MITRE_DATA_PATH),
            repo_dir: PathBuf::from("."),
            git_remote: DEFAULT_GIT_REMOTE.to_string(),
            webhook_secret: None,
            expected_repo_url: None,
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            pull_timeout: Duration::from_secs(DEFAULT_PULL_TIMEOUT_SECS),
            reload_timeout: Duration::from_secs(DEFAULT_RELOAD_TIMEOUT_SECS),
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),

            content_dir: env::var("CONTENT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.content_dir),

            content_recursive: env::var("CONTENT_RECURSIVE")
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.content_recursive),

            mitre_data_path: env::var("MITRE_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.mitre_data_path),

            repo_dir: env::var("REPO_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.repo_dir),

            git_remote: env::var("GIT_REMOTE").unwrap_or(defaults.git_remote),

            webhook_secret: env::var("GITHUB_WEBHOOK_SECRET")
                .ok()
                .and_then(WebhookSecret::new),

            expected_repo_url: env::var("EXPECTED_REPO_URL")
                .ok()
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty()),

            probe_timeout: env_secs("GIT_PROBE_TIMEOUT_SECS").unwrap_or(defaults.probe_timeout),
            pull_timeout: env_secs("GIT_PULL_TIMEOUT_SECS").unwrap_or(defaults.pull_timeout),
            reload_timeout: env_secs("RELOAD_TIMEOUT_SECS").unwrap_or(defaults.reload_timeout),

            log_format: env::var("LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or(defaults.log_format),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn data_paths(&self) -> DataPaths {
        DataPaths {
            loader: LoaderOptions {
                content_dir: self.content_dir.clone(),
                recursive: self.content_recursive,
                max_document_bytes: MAX_DOCUMENT_BYTES,
            },
            mitre_data: self.mitre_data_path.clone(),
        }
    }

    pub fn refresh_config(&self) -> RefreshConfig {
        RefreshConfig {
            secret: self.webhook_secret.clone(),
            expected_remote: self.expected_repo_url.clone(),
            allowed_branches: ALLOWED_BRANCHES.iter().map(|b| b.to_string()).collect(),
            data: self.data_paths(),
            probe_timeout: self.probe_timeout,
            pull_timeout: self.pull_timeout,
            reload_timeout: self.reload_timeout,
        }
    }

    pub fn git_source_config(&self) -> GitSourceConfig {
        GitSourceConfig {
            repo_dir: self.repo_dir.clone(),
            remote: self.git_remote.clone(),
            ..Default::default()
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Positive whole seconds; zero or garbage falls back to the default
fn env_secs(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|s| *s > 0)
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool(" YES "), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_log_format() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("text"), LogFormat::Text);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Text);
    }

    #[test]
    fn test_conversions_carry_settings() {
        let config = Config {
            content_dir: PathBuf::from("/srv/content/queries"),
            content_recursive: true,
            git_remote: "upstream".into(),
            webhook_secret: WebhookSecret::new("s3cret"),
            expected_repo_url: Some("https://github.com/acme/content".into()),
            pull_timeout: Duration::from_secs(12),
            ..Default::default()
        };

        let refresh = config.refresh_config();
        assert!(refresh.secret.is_some());
        assert_eq!(refresh.pull_timeout, Duration::from_secs(12));
        assert_eq!(refresh.allowed_branches, vec!["main", "master"]);
        assert!(refresh.data.loader.recursive);
        assert_eq!(refresh.data.loader.content_dir, PathBuf::from("/srv/content/queries"));

        assert_eq!(config.git_source_config().remote, "upstream");
        assert!(!format!("{:?}", config).contains("s3cret"));
    }
}
