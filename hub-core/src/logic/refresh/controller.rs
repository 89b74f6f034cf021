//! Refresh Controller
//!
//! Drives one trigger through Verifying → Advancing → Reloading → Published.
//! Signature and event checks are stateless and run before the single-writer
//! gate; everything that touches the content source runs under it, on a
//! spawned task that holds the gate until it finishes. A caller that goes away
//! mid-refresh does not cut the refresh short. Any failure leaves the published
//! snapshot untouched.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::logic::snapshot::{DatasetSnapshot, SnapshotStore};
use super::signature::{verify_signature, SignatureError};
use super::source::{redact_credentials, same_remote, ContentSource, SourceError};
use super::types::{
    RefreshConfig, RefreshState, RefreshStatus, RefreshSummary, RefreshTrigger, TriggerOutcome,
    WebhookEvent,
};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefreshError {
    #[error("signature verification failed: {0}")]
    Signature(#[from] SignatureError),
    #[error("repository mismatch: expected {expected}, found {actual}")]
    RemoteMismatch { expected: String, actual: String },
    #[error("branch '{0}' is not allowed for refresh")]
    BranchNotAllowed(String),
    #[error("content source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("a refresh is already in progress")]
    InProgress,
    #[error("update timed out after {0:?}")]
    AdvanceTimeout(Duration),
    #[error("update failed: {0}")]
    AdvanceFailed(SourceError),
    #[error("reload timed out after {0:?}")]
    ReloadTimeout(Duration),
    #[error("reload failed: {0}")]
    ReloadFailed(String),
    #[error("refresh task aborted: {0}")]
    Aborted(String),
}

impl RefreshError {
    /// Refused during verification, as opposed to failing mid-refresh
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            RefreshError::Signature(_)
                | RefreshError::RemoteMismatch { .. }
                | RefreshError::BranchNotAllowed(_)
                | RefreshError::SourceUnavailable(_)
                | RefreshError::InProgress
        )
    }

    /// Display text with any URL credentials masked
    pub fn redacted(&self) -> String {
        redact_credentials(&self.to_string())
    }
}

// ============================================================================
// CONTROLLER
// ============================================================================

pub struct RefreshController {
    pipeline: Arc<Pipeline>,
    gate: Arc<Mutex<()>>,
    rejected: AtomicU64,
}

/// State the spawned refresh task shares with the controller
struct Pipeline {
    config: RefreshConfig,
    source: Arc<dyn ContentSource>,
    store: Arc<SnapshotStore>,
    status: RwLock<RefreshStatus>,
}

impl RefreshController {
    pub fn new(config: RefreshConfig, source: Arc<dyn ContentSource>, store: Arc<SnapshotStore>) -> Self {
        if config.secret.is_none() {
            log::warn!("Webhook secret is not configured; every refresh trigger will be rejected");
        }
        Self {
            pipeline: Arc::new(Pipeline {
                config,
                source,
                store,
                status: RwLock::new(RefreshStatus::default()),
            }),
            gate: Arc::new(Mutex::new(())),
            rejected: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.pipeline.store
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.pipeline.config
    }

    pub fn status(&self) -> RefreshStatus {
        let mut status = self.pipeline.status.read().clone();
        status.generation = self.pipeline.store.generation();
        status.rejected_triggers = self.rejected.load(Ordering::Relaxed);
        status
    }

    /// Handle one inbound trigger.
    ///
    /// Once a refresh is admitted it runs to completion (or to its own
    /// timeouts) even if this future is dropped.
    pub async fn handle(&self, trigger: RefreshTrigger<'_>) -> Result<TriggerOutcome, RefreshError> {
        let config = &self.pipeline.config;
        if let Err(e) = verify_signature(config.secret.as_ref(), trigger.payload, trigger.signature) {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            log::warn!("Rejected refresh trigger: {}", e);
            return Err(e.into());
        }

        let raw_event = trigger.event.unwrap_or_default();
        match WebhookEvent::parse(raw_event) {
            None => {
                log::info!("Ignoring webhook event '{}'", raw_event);
                return Ok(TriggerOutcome::Ignored {
                    event: raw_event.to_string(),
                });
            }
            Some(WebhookEvent::Ping) => {
                log::info!("Webhook ping received");
                return Ok(TriggerOutcome::Pong);
            }
            Some(WebhookEvent::Push) | Some(WebhookEvent::WorkflowRun) => {}
        }

        let guard = match self.gate.clone().try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                log::warn!("Refresh trigger rejected: another refresh is in flight");
                return Err(RefreshError::InProgress);
            }
        };

        // Status moves to Verifying before the task is scheduled
        self.pipeline.begin();

        let pipeline = self.pipeline.clone();
        let task = tokio::spawn(async move { pipeline.refresh(guard).await });

        match task.await {
            Ok(result) => result.map(TriggerOutcome::Refreshed),
            Err(e) => {
                let err = RefreshError::Aborted(e.to_string());
                self.pipeline.finish(&Err(err.clone()));
                Err(err)
            }
        }
    }
}

impl Pipeline {
    fn begin(&self) {
        let mut status = self.status.write();
        status.state = RefreshState::Verifying;
        status.last_attempt_at = Some(Utc::now());
    }

    /// Runs on its own task; `_gate` is released when it returns
    async fn refresh(&self, _gate: OwnedMutexGuard<()>) -> Result<RefreshSummary, RefreshError> {
        let result = self.run(Instant::now()).await;
        self.finish(&result);
        result
    }

    fn finish(&self, result: &Result<RefreshSummary, RefreshError>) {
        let mut status = self.status.write();
        match result {
            Ok(summary) => {
                status.state = RefreshState::Published;
                status.last_success_at = Some(Utc::now());
                status.last_error = None;
                log::info!(
                    "Refresh of '{}' published generation {} in {}ms",
                    summary.branch,
                    summary.generation,
                    summary.duration_ms
                );
            }
            Err(e) => {
                status.state = if e.is_rejection() {
                    RefreshState::Rejected
                } else {
                    RefreshState::Failed
                };
                status.last_error = Some(e.redacted());
                log::error!("Refresh failed: {}", e.redacted());
            }
        }
    }

    async fn run(&self, started: Instant) -> Result<RefreshSummary, RefreshError> {
        if let Some(expected) = &self.config.expected_remote {
            let actual = self.probe("remote lookup", self.source.remote_url()).await?;
            if !same_remote(expected, &actual) {
                return Err(RefreshError::RemoteMismatch {
                    expected: redact_credentials(expected),
                    actual: redact_credentials(&actual),
                });
            }
        }

        let branch = self.probe("branch lookup", self.source.current_branch()).await?;
        if !self.config.allowed_branches.iter().any(|b| *b == branch) {
            return Err(RefreshError::BranchNotAllowed(branch));
        }

        self.set_state(RefreshState::Advancing);
        let pull_timeout = self.config.pull_timeout;
        let git_output = match tokio::time::timeout(pull_timeout, self.source.fast_forward(&branch)).await {
            Err(_) => return Err(RefreshError::AdvanceTimeout(pull_timeout)),
            Ok(Err(e)) => return Err(RefreshError::AdvanceFailed(e)),
            Ok(Ok(output)) => output,
        };

        self.set_state(RefreshState::Reloading);
        let reload_timeout = self.config.reload_timeout;
        let paths = self.config.data.clone();
        let rebuild = tokio::task::spawn_blocking(move || DatasetSnapshot::build(&paths));
        let snapshot = match tokio::time::timeout(reload_timeout, rebuild).await {
            Err(_) => return Err(RefreshError::ReloadTimeout(reload_timeout)),
            Ok(Err(e)) => return Err(RefreshError::ReloadFailed(e.to_string())),
            Ok(Ok(snapshot)) => snapshot,
        };

        let published = self.store.publish(snapshot);

        Ok(RefreshSummary {
            branch,
            git_output: if git_output.is_empty() {
                "Up to date".to_string()
            } else {
                redact_credentials(&git_output)
            },
            generation: published.generation,
            records_loaded: published.records.len(),
            load_errors: published.load_errors.len(),
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Bounded read-only call into the content source
    async fn probe<F>(&self, what: &str, call: F) -> Result<String, RefreshError>
    where
        F: Future<Output = Result<String, SourceError>>,
    {
        match tokio::time::timeout(self.config.probe_timeout, call).await {
            Err(_) => Err(RefreshError::SourceUnavailable(format!(
                "{} timed out after {:?}",
                what, self.config.probe_timeout
            ))),
            Ok(Err(e)) => Err(RefreshError::SourceUnavailable(redact_credentials(&e.to_string()))),
            Ok(Ok(value)) => Ok(value.trim().to_string()),
        }
    }

    fn set_state(&self, state: RefreshState) {
        self.status.write().state = state;
    }
}
