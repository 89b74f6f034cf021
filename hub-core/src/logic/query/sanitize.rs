//! Search input validation
//!
//! Allow-list validation of raw search parameters. Invalid values never fail
//! the request; they disable their filter (or fall back to name ordering)
//! and log a warning.

use crate::constants::{
    FILTER_ALL, MAX_CONTENT_TYPE_LENGTH, MAX_LOG_SOURCE_LENGTH, MAX_MITRE_IDS_COUNT,
    MAX_MITRE_ID_LENGTH, MAX_SEARCH_QUERY_LENGTH, MAX_SORT_OPTION_LENGTH,
};
use crate::logic::content::{canonical_mitre_id, ContentType, FilterIndex};
use super::types::{SearchParams, SearchRequest, SortKey};

/// Trim and cap at `max` characters
pub fn sanitize_string(value: &str, max: usize) -> &str {
    let value = value.trim();
    match value.char_indices().nth(max) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}

/// Log-safe prefix of an untrusted value
fn preview(value: &str) -> &str {
    sanitize_string(value, 50)
}

impl SearchParams {
    /// Validate against the allow-lists and the current filter index
    pub fn sanitize(&self, filters: &FilterIndex) -> SearchRequest {
        SearchRequest {
            text: sanitize_string(&self.q, MAX_SEARCH_QUERY_LENGTH).to_lowercase(),
            content_type: validate_content_type(&self.content_type),
            mitre_ids: validate_mitre_ids(&self.mitre),
            log_source: validate_log_source(&self.log_source, filters),
            sort: validate_sort_option(&self.sort_by),
        }
    }
}

pub fn validate_content_type(raw: &str) -> Option<ContentType> {
    let value = sanitize_string(raw, MAX_CONTENT_TYPE_LENGTH).to_lowercase();
    if value.is_empty() || value == FILTER_ALL {
        return None;
    }
    let parsed = ContentType::parse(&value);
    if parsed.is_none() {
        log::warn!("Invalid content_type received: {}", preview(&value));
    }
    parsed
}

pub fn validate_sort_option(raw: &str) -> SortKey {
    let value = sanitize_string(raw, MAX_SORT_OPTION_LENGTH).to_lowercase();
    if value.is_empty() {
        return SortKey::default();
    }
    SortKey::parse(&value).unwrap_or_else(|| {
        log::warn!("Invalid sort_by received: {}", value);
        SortKey::default()
    })
}

/// Keep at most the first `MAX_MITRE_IDS_COUNT` entries; drop invalid ones
pub fn validate_mitre_ids(raw: &[String]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for candidate in raw.iter().take(MAX_MITRE_IDS_COUNT) {
        let candidate = sanitize_string(candidate, MAX_MITRE_ID_LENGTH);
        if let Some(id) = canonical_mitre_id(candidate) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

/// Only log sources present in the current dataset are honoured
pub fn validate_log_source(raw: &str, filters: &FilterIndex) -> Option<String> {
    let value = sanitize_string(raw, MAX_LOG_SOURCE_LENGTH);
    if value.is_empty() || value == FILTER_ALL {
        return None;
    }
    if !filters.has_log_source(value) {
        log::warn!("Unknown log_source received: {}", preview(value));
        return None;
    }
    Some(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_string_trims_and_caps() {
        assert_eq!(sanitize_string("  abc  ", 10), "abc");
        assert_eq!(sanitize_string("abcdef", 3), "abc");
        assert_eq!(sanitize_string("ééééé", 2), "éé");
    }

    #[test]
    fn test_content_type_validation() {
        assert_eq!(validate_content_type(""), None);
        assert_eq!(validate_content_type("all"), None);
        assert_eq!(validate_content_type("ALL"), None);
        assert_eq!(validate_content_type(" Hunting "), Some(ContentType::Hunting));
        assert_eq!(validate_content_type("<script>"), None);
    }

    #[test]
    fn test_sort_validation_falls_back_to_name() {
        assert_eq!(validate_sort_option("severity"), SortKey::Severity);
        assert_eq!(validate_sort_option("NAME-DESC"), SortKey::NameDesc);
        assert_eq!(validate_sort_option("random"), SortKey::Name);
        assert_eq!(validate_sort_option(""), SortKey::Name);
    }

    #[test]
    fn test_mitre_validation_caps_and_filters() {
        let raw: Vec<String> = vec!["t1055".into(), "bogus".into(), "T1055".into(), "T1078.004".into()];
        assert_eq!(validate_mitre_ids(&raw), vec!["T1055", "T1078.004"]);

        let many: Vec<String> = (0..80).map(|i| format!("T{:04}", 1000 + i)).collect();
        let ids = validate_mitre_ids(&many);
        assert_eq!(ids.len(), MAX_MITRE_IDS_COUNT);
        assert_eq!(ids.last().map(String::as_str), Some("T1049"));
    }

    #[test]
    fn test_unknown_log_source_disables_filter() {
        let mut filters = FilterIndex::default();
        filters.log_sources.insert("xdr_data".to_string());

        assert_eq!(validate_log_source("xdr_data", &filters), Some("xdr_data".to_string()));
        assert_eq!(validate_log_source("  xdr_data ", &filters), Some("xdr_data".to_string()));
        assert_eq!(validate_log_source("okta", &filters), None);
        assert_eq!(validate_log_source("all", &filters), None);
    }

    #[test]
    fn test_search_text_is_lowercased() {
        let params = SearchParams {
            q: "  PowerShell  ".into(),
            ..Default::default()
        };
        let request = params.sanitize(&FilterIndex::default());
        assert_eq!(request.text, "powershell");
        assert_eq!(request.sort, SortKey::Name);
    }
}
