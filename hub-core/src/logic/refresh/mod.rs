//! Refresh Module - webhook-triggered content refresh
//!
//! # Components
//! - `types.rs`: trigger, outcome, status and config types
//! - `signature.rs`: HMAC-SHA256 webhook signatures
//! - `source.rs`: `ContentSource` capability, remote identity, redaction
//! - `git.rs`: `GitSource`, the git-backed implementation
//! - `controller.rs`: the single-writer refresh state machine

pub mod types;
pub mod signature;
pub mod source;
pub mod git;
pub mod controller;


pub use types::{
    RefreshConfig, RefreshState, RefreshStatus, RefreshSummary, RefreshTrigger, TriggerOutcome,
    WebhookEvent, WebhookSecret,
};
pub use signature::{sign_payload, verify_signature, SignatureError};
pub use source::{normalize_remote_url, redact_credentials, same_remote, ContentSource, SourceError};
pub use git::{GitSource, GitSourceConfig};
pub use controller::{RefreshController, RefreshError};
