//! Central Configuration Constants
//!
//! Single source of truth for limits, allow-lists and defaults shared by
//! the loader, the query engine and the refresh pipeline.

/// Library version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "XQL Hub";

// ============================================
// Content loading
// ============================================

/// File extensions recognized as content documents (compared case-insensitively)
pub const CONTENT_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Documents larger than this are rejected without being parsed
pub const MAX_DOCUMENT_BYTES: u64 = 1024 * 1024;

/// Default content directory (relative to the working directory)
pub const DEFAULT_CONTENT_DIR: &str = "queries";

/// Default taxonomy snapshot path (written by the taxonomy downloader)
pub const DEFAULT_MITRE_DATA_PATH: &str = "data/mitre_data.json";

// ============================================
// Search input limits
// ============================================

pub const MAX_SEARCH_QUERY_LENGTH: usize = 500;
pub const MAX_CONTENT_TYPE_LENGTH: usize = 50;
pub const MAX_MITRE_ID_LENGTH: usize = 20;
pub const MAX_MITRE_IDS_COUNT: usize = 50;
pub const MAX_LOG_SOURCE_LENGTH: usize = 100;
pub const MAX_SORT_OPTION_LENGTH: usize = 20;

/// Filter value that disables a single-select filter
pub const FILTER_ALL: &str = "all";

// ============================================
// Refresh pipeline
// ============================================

/// Branches the content source may be advanced on
pub const ALLOWED_BRANCHES: &[&str] = &["main", "master"];

/// Prefix of the signature header value
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Default git remote name
pub const DEFAULT_GIT_REMOTE: &str = "origin";

/// Default timeout for remote/branch probes (seconds)
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Default timeout for the fast-forward pull (seconds)
pub const DEFAULT_PULL_TIMEOUT_SECS: u64 = 30;

/// Default timeout for rebuilding a snapshot (seconds)
pub const DEFAULT_RELOAD_TIMEOUT_SECS: u64 = 60;
