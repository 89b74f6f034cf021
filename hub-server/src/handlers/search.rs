//! Search handler

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use xql_hub_core::{search as run_search, ContentRecord, SearchParams, SortKey};

use crate::AppState;

/// A record as returned by the read API
#[derive(Debug, Serialize)]
pub struct ContentView {
    #[serde(flatten)]
    pub record: ContentRecord,
    pub content_type_label: &'static str,
}

impl From<&ContentRecord> for ContentView {
    fn from(record: &ContentRecord) -> Self {
        Self {
            content_type_label: record.content_type.label(),
            record: record.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub count: usize,
    pub generation: u64,
    pub sort_by: SortKey,
    pub results: Vec<ContentView>,
}

/// Fold query pairs into raw params; `mitre` may repeat
pub fn params_from_pairs(pairs: Vec<(String, String)>) -> SearchParams {
    let mut params = SearchParams::default();
    for (key, value) in pairs {
        match key.as_str() {
            "q" => params.q = value,
            "content_type" => params.content_type = value,
            "mitre" => params.mitre.push(value),
            "log_source" => params.log_source = value,
            "sort_by" => params.sort_by = value,
            _ => {}
        }
    }
    params
}

/// Search the current snapshot
pub async fn search(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<SearchResponse> {
    let snapshot = state.store.current();
    let request = params_from_pairs(pairs).sanitize(&snapshot.filters);

    let results: Vec<ContentView> = run_search(&snapshot.records, &request)
        .into_iter()
        .map(ContentView::from)
        .collect();

    tracing::debug!(
        count = results.len(),
        generation = snapshot.generation,
        "Search served"
    );

    Json(SearchResponse {
        count: results.len(),
        generation: snapshot.generation,
        sort_by: request.sort,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_mitre_keys_accumulate() {
        let params = params_from_pairs(vec![
            ("q".into(), "login".into()),
            ("mitre".into(), "T1078".into()),
            ("mitre".into(), "T1110".into()),
            ("page".into(), "2".into()),
        ]);
        assert_eq!(params.q, "login");
        assert_eq!(params.mitre, vec!["T1078", "T1110"]);
        assert_eq!(params.sort_by, "");
    }
}
