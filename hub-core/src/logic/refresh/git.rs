//! Git-backed content source
//!
//! Shells out to `git` in the repository that holds the content directory.
//! Every invocation runs non-interactively with hooks, credential helpers and
//! the `ext::` transport disabled, and is killed if its future is dropped.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::constants::DEFAULT_GIT_REMOTE;
use super::source::{redact_credentials, ContentSource, SourceError};

/// Options passed to every git invocation, before the subcommand
const HARDENING_ARGS: &[&str] = &[
    "-c", "core.hooksPath=/dev/null",
    "-c", "credential.helper=",
    "-c", "protocol.ext.allow=never",
];

const HARDENING_ENV: &[(&str, &str)] = &[
    ("GIT_TERMINAL_PROMPT", "0"),
    ("GIT_ASKPASS", "/bin/true"),
    ("SSH_ASKPASS", "/bin/true"),
    ("GIT_CONFIG_NOSYSTEM", "1"),
    ("GIT_SSH_COMMAND", "ssh -o BatchMode=yes"),
];

const DIVERGED_MARKERS: &[&str] = &[
    "not possible to fast-forward",
    "have diverged",
    "diverging",
];

#[derive(Debug, Clone)]
pub struct GitSourceConfig {
    /// Working copy root
    pub repo_dir: PathBuf,
    /// Remote name to verify and pull from
    pub remote: String,
    pub git_binary: PathBuf,
}

impl Default for GitSourceConfig {
    fn default() -> Self {
        Self {
            repo_dir: PathBuf::from("."),
            remote: DEFAULT_GIT_REMOTE.to_string(),
            git_binary: PathBuf::from("git"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GitSource {
    config: GitSourceConfig,
}

impl GitSource {
    pub fn new(config: GitSourceConfig) -> Result<Self, SourceError> {
        let remote = config.remote.trim();
        if remote.is_empty() {
            return Err(SourceError::InvalidConfig("git remote name is empty".into()));
        }
        // would be parsed as an option by git
        if remote.starts_with('-') {
            return Err(SourceError::InvalidConfig(format!(
                "git remote name may not start with '-': {}",
                remote
            )));
        }
        if remote.chars().any(char::is_whitespace) {
            return Err(SourceError::InvalidConfig(format!(
                "git remote name may not contain whitespace: {}",
                remote
            )));
        }

        Ok(Self {
            config: GitSourceConfig {
                remote: remote.to_string(),
                ..config
            },
        })
    }

    pub fn config(&self) -> &GitSourceConfig {
        &self.config
    }

    /// Run `git <args>` and return trimmed stdout
    async fn run(&self, operation: &'static str, args: &[&str]) -> Result<String, SourceError> {
        log::debug!("git {} in {}", args.join(" "), self.config.repo_dir.display());

        let output = Command::new(&self.config.git_binary)
            .args(HARDENING_ARGS)
            .args(args)
            .current_dir(&self.config.repo_dir)
            .envs(HARDENING_ENV.iter().copied())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| SourceError::Spawn {
                operation,
                message: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = redact_credentials(String::from_utf8_lossy(&output.stderr).trim());

        if output.status.success() {
            return Ok(stdout);
        }

        let lowered = stderr.to_lowercase();
        if DIVERGED_MARKERS.iter().any(|m| lowered.contains(m)) {
            return Err(SourceError::Diverged(stderr));
        }

        Err(SourceError::CommandFailed {
            operation,
            status: output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| format!("exit {}", c)),
            stderr,
        })
    }
}

#[async_trait]
impl ContentSource for GitSource {
    async fn remote_url(&self) -> Result<String, SourceError> {
        self.run("remote get-url", &["remote", "get-url", &self.config.remote])
            .await
    }

    async fn current_branch(&self) -> Result<String, SourceError> {
        self.run("branch --show-current", &["branch", "--show-current"])
            .await
    }

    async fn fast_forward(&self, branch: &str) -> Result<String, SourceError> {
        if branch.starts_with('-') || branch.is_empty() {
            return Err(SourceError::InvalidConfig(format!("refusing to pull branch '{}'", branch)));
        }
        self.run(
            "pull --ff-only",
            &[
                "pull",
                "--ff-only",
                "--no-recurse-submodules",
                &self.config.remote,
                branch,
            ],
        )
        .await
    }
}
