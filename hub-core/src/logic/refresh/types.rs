//! Refresh Pipeline Types

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::constants::{
    ALLOWED_BRANCHES, DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_PULL_TIMEOUT_SECS,
    DEFAULT_RELOAD_TIMEOUT_SECS,
};
use crate::logic::snapshot::DataPaths;

// ============================================================================
// SECRET
// ============================================================================

/// Pre-shared webhook secret. Never printed.
#[derive(Clone)]
pub struct WebhookSecret(String);

impl WebhookSecret {
    /// Blank secrets count as unset
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub(crate) fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WebhookSecret(***)")
    }
}

// ============================================================================
// TRIGGER
// ============================================================================

/// Webhook events that are acted upon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEvent {
    Push,
    WorkflowRun,
    Ping,
}

impl WebhookEvent {
    /// Anything outside the allow-list is `None`
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "push" => Some(WebhookEvent::Push),
            "workflow_run" => Some(WebhookEvent::WorkflowRun),
            "ping" => Some(WebhookEvent::Ping),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookEvent::Push => "push",
            WebhookEvent::WorkflowRun => "workflow_run",
            WebhookEvent::Ping => "ping",
        }
    }
}

/// An inbound refresh request, exactly as received
#[derive(Debug, Clone, Copy)]
pub struct RefreshTrigger<'a> {
    /// Raw request body; the signature covers these bytes
    pub payload: &'a [u8],
    /// `sha256=<hex>` header value
    pub signature: Option<&'a str>,
    /// Event-type header value
    pub event: Option<&'a str>,
}

/// Non-error results of handling a trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Authenticated, but the event type is not acted upon
    Ignored { event: String },
    /// Ping acknowledged; nothing advanced
    Pong,
    Refreshed(RefreshSummary),
}

/// What a successful refresh did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub branch: String,
    pub git_output: String,
    pub generation: u64,
    pub records_loaded: usize,
    pub load_errors: usize,
    pub duration_ms: u64,
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshState {
    Idle,
    Verifying,
    Advancing,
    Reloading,
    Published,
    Rejected,
    Failed,
}

impl RefreshState {
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            RefreshState::Verifying | RefreshState::Advancing | RefreshState::Reloading
        )
    }
}

/// Observable controller state
#[derive(Debug, Clone, Serialize)]
pub struct RefreshStatus {
    pub state: RefreshState,
    pub generation: u64,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
    /// Redacted message of the last failed or rejected refresh
    pub last_error: Option<String>,
    /// Triggers refused before reaching the content source
    pub rejected_triggers: u64,
}

impl Default for RefreshStatus {
    fn default() -> Self {
        Self {
            state: RefreshState::Idle,
            generation: 0,
            last_attempt_at: None,
            last_success_at: None,
            last_error: None,
            rejected_triggers: 0,
        }
    }
}

// ============================================================================
// CONFIG
// ============================================================================

/// Refresh controller configuration
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Unset means every trigger is rejected
    pub secret: Option<WebhookSecret>,
    /// Expected content-source remote; unset skips the check
    pub expected_remote: Option<String>,
    pub allowed_branches: Vec<String>,
    pub data: DataPaths,
    pub probe_timeout: Duration,
    pub pull_timeout: Duration,
    pub reload_timeout: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            secret: None,
            expected_remote: None,
            allowed_branches: ALLOWED_BRANCHES.iter().map(|b| b.to_string()).collect(),
            data: DataPaths::default(),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            pull_timeout: Duration::from_secs(DEFAULT_PULL_TIMEOUT_SECS),
            reload_timeout: Duration::from_secs(DEFAULT_RELOAD_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = WebhookSecret::new("hunter2").unwrap();
        assert_eq!(format!("{:?}", secret), "WebhookSecret(***)");

        let config = RefreshConfig {
            secret: Some(secret),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn test_blank_secret_is_unset() {
        assert!(WebhookSecret::new("").is_none());
        assert!(WebhookSecret::new("   ").is_none());
    }

    #[test]
    fn test_event_allow_list() {
        assert_eq!(WebhookEvent::parse("push"), Some(WebhookEvent::Push));
        assert_eq!(WebhookEvent::parse("workflow_run"), Some(WebhookEvent::WorkflowRun));
        assert_eq!(WebhookEvent::parse("ping"), Some(WebhookEvent::Ping));
        assert_eq!(WebhookEvent::parse("issues"), None);
        assert_eq!(WebhookEvent::parse("PUSH"), None);
        assert_eq!(WebhookEvent::parse(""), None);
    }
}
