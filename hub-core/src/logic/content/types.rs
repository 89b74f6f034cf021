//! Content Record Types

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ============================================================================
// CONTENT TYPE
// ============================================================================

/// Kind of detection content a document carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Bioc,
    Correlation,
    Hunting,
    Hygiene,
    Widget,
    Xql,
}

impl ContentType {
    pub const ALL: [ContentType; 6] = [
        ContentType::Bioc,
        ContentType::Correlation,
        ContentType::Hunting,
        ContentType::Hygiene,
        ContentType::Widget,
        ContentType::Xql,
    ];

    /// Parse a raw value (trimmed, case-insensitive). Returns None for unknown types.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bioc" => Some(ContentType::Bioc),
            "correlation" => Some(ContentType::Correlation),
            "hunting" => Some(ContentType::Hunting),
            "hygiene" => Some(ContentType::Hygiene),
            "widget" => Some(ContentType::Widget),
            "xql" => Some(ContentType::Xql),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Bioc => "bioc",
            ContentType::Correlation => "correlation",
            ContentType::Hunting => "hunting",
            ContentType::Hygiene => "hygiene",
            ContentType::Widget => "widget",
            ContentType::Xql => "xql",
        }
    }

    /// Display label used by the presentation layer
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Hunting => "Threat Hunting",
            ContentType::Bioc => "BIOC",
            ContentType::Correlation => "Correlation Rule",
            ContentType::Hygiene => "IT Hygiene",
            ContentType::Widget => "Dashboard Widget",
            ContentType::Xql => "XQL Query",
        }
    }
}

impl Default for ContentType {
    fn default() -> Self {
        ContentType::Xql
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// CONTENT RECORD
// ============================================================================

/// One normalized detection-content document.
///
/// Records are only ever built by the loader, so every published record has
/// a valid `content_type` and canonical `mitre_ids`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentRecord {
    pub id: String,
    pub content_type: ContentType,
    pub mitre_ids: Vec<String>,
    pub log_sources: Vec<String>,
    pub tags: Vec<String>,
    pub name: String,
    pub description: String,
    pub author: String,
    pub query: String,
    pub severity: String,
    /// Remaining top-level document keys, kept for presentation only
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

// ============================================================================
// FILTER INDEX
// ============================================================================

/// Distinct filterable values seen during one load pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterIndex {
    pub types: BTreeSet<ContentType>,
    pub log_sources: BTreeSet<String>,
    pub mitre_ids: BTreeSet<String>,
}

impl FilterIndex {
    /// Fold one record's values into the index
    pub fn absorb(&mut self, record: &ContentRecord) {
        self.types.insert(record.content_type);
        self.mitre_ids.extend(record.mitre_ids.iter().cloned());
        self.log_sources.extend(record.log_sources.iter().cloned());
    }

    pub fn has_log_source(&self, source: &str) -> bool {
        self.log_sources.contains(source)
    }
}

// ============================================================================
// LOAD ERRORS
// ============================================================================

/// Why a single document was skipped
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadErrorKind {
    #[error("read failed: {0}")]
    Io(String),
    #[error("document is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
    #[error("invalid YAML - {0}")]
    Parse(String),
    #[error("YAML root must be a mapping")]
    NotAMapping,
}

/// A per-file load failure; never fatal for the batch
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{file}: {kind}")]
pub struct LoadError {
    pub file: String,
    pub kind: LoadErrorKind,
}

/// Result of loading a content directory
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub records: Vec<ContentRecord>,
    pub filters: FilterIndex,
    pub errors: Vec<LoadError>,
    /// Number of candidate documents that were examined
    pub files_seen: usize,
}

/// How the loader walks the content directory
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    pub content_dir: PathBuf,
    /// Descend into sub-directories; ids become relative paths
    pub recursive: bool,
    pub max_document_bytes: u64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from(crate::constants::DEFAULT_CONTENT_DIR),
            recursive: false,
            max_document_bytes: crate::constants::MAX_DOCUMENT_BYTES,
        }
    }
}
