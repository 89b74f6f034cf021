//! Query Engine
//!
//! Search, filter and sort over a snapshot's records. Pure: the same
//! records and request always give the same result, and nothing is mutated.

use std::cmp::Reverse;

use crate::logic::content::ContentRecord;
use crate::logic::taxonomy::matches_any_technique;
use super::types::{SearchRequest, SortKey};

/// Run `request` against `records`, returning matches in result order
pub fn search<'a>(records: &'a [ContentRecord], request: &SearchRequest) -> Vec<&'a ContentRecord> {
    let needle = request.text.trim().to_lowercase();

    let mut results: Vec<&ContentRecord> = records
        .iter()
        .filter(|r| needle.is_empty() || matches_text(r, &needle))
        .filter(|r| request.content_type.map_or(true, |ct| r.content_type == ct))
        .filter(|r| request.mitre_ids.is_empty() || matches_any_technique(&request.mitre_ids, r))
        .filter(|r| {
            request
                .log_source
                .as_deref()
                .map_or(true, |source| r.log_sources.iter().any(|s| s == source))
        })
        .collect();

    sort_records(&mut results, request.sort);
    results
}

/// Substring match over the searchable fields only; `extra` is never searched.
/// `needle` must already be lower-cased.
pub fn matches_text(record: &ContentRecord, needle: &str) -> bool {
    [&record.name, &record.description, &record.author, &record.query]
        .into_iter()
        .chain(record.tags.iter())
        .any(|field| field.to_lowercase().contains(needle))
}

/// critical 0 .. informational 4; unset and unknown 5
pub fn severity_rank(severity: &str) -> u8 {
    match severity.trim().to_lowercase().as_str() {
        "critical" => 0,
        "high" => 1,
        "medium" => 2,
        "low" => 3,
        "informational" => 4,
        _ => 5,
    }
}

/// Stable sort; ties keep their current relative order
pub fn sort_records(records: &mut [&ContentRecord], key: SortKey) {
    match key {
        SortKey::Name => records.sort_by_cached_key(|r| r.name.to_lowercase()),
        SortKey::NameDesc => records.sort_by_cached_key(|r| Reverse(r.name.to_lowercase())),
        SortKey::Severity => records.sort_by_key(|r| severity_rank(&r.severity)),
        SortKey::Type => records.sort_by_key(|r| r.content_type.as_str()),
    }
}
