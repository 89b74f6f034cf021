//! Search Request Types

use serde::{Deserialize, Serialize};

use crate::logic::content::ContentType;

/// Result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Case-insensitive name, ascending
    #[default]
    Name,
    /// Case-insensitive name, descending
    NameDesc,
    /// Critical first, unset/unknown last
    Severity,
    /// Content type string, ascending
    Type,
}

impl SortKey {
    /// Unknown keys are `None`; callers fall back to [`SortKey::Name`]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "name" => Some(SortKey::Name),
            "name-desc" => Some(SortKey::NameDesc),
            "severity" => Some(SortKey::Severity),
            "type" => Some(SortKey::Type),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::NameDesc => "name-desc",
            SortKey::Severity => "severity",
            SortKey::Type => "type",
        }
    }
}

/// A validated search. `None`/empty fields disable that filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    /// Free text, matched case-insensitively
    pub text: String,
    pub content_type: Option<ContentType>,
    /// Canonical technique ids; OR-matched
    pub mitre_ids: Vec<String>,
    pub log_source: Option<String>,
    pub sort: SortKey,
}

/// Raw, untrusted search parameters as they arrive from a caller
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub q: String,
    pub content_type: String,
    pub mitre: Vec<String>,
    pub log_source: String,
    pub sort_by: String,
}
