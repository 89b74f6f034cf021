//! Catalog handlers - filters, taxonomy, matrix, single records

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use xql_hub_core::ContentType;

use crate::handlers::search::ContentView;
use crate::{AppError, AppResult, AppState};

/// Available filter values plus the taxonomy
pub async fn filters(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.store.current();

    Json(json!({
        "types": snapshot.filters.types,
        "log_sources": snapshot.filters.log_sources,
        "mitre_ids": snapshot.filters.mitre_ids,
        "tactics": snapshot.taxonomy.tactics,
        "mitre_data": snapshot.taxonomy.techniques,
    }))
}

/// Content type → display label
pub async fn content_types() -> Json<BTreeMap<&'static str, &'static str>> {
    Json(
        ContentType::ALL
            .iter()
            .map(|t| (t.as_str(), t.label()))
            .collect(),
    )
}

/// Full ATT&CK data
pub async fn mitre(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.store.current();

    Json(json!({
        "tactics": snapshot.taxonomy.tactics,
        "techniques": snapshot.taxonomy.techniques,
    }))
}

/// Techniques in use, grouped by tactic
pub async fn matrix(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.store.current();
    let in_use = snapshot.techniques_in_use();
    let matrix = xql_hub_core::logic::taxonomy::build_matrix(&in_use, &snapshot.taxonomy);

    Json(json!({
        "columns": matrix.columns,
        "unmapped": matrix.unmapped,
        "techniques_in_use": in_use.values().collect::<Vec<_>>(),
    }))
}

/// Single record by id (relative path)
pub async fn content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ContentView>> {
    let snapshot = state.store.current();
    let record = snapshot
        .find(&id)
        .ok_or_else(|| AppError::NotFound(format!("Content '{}' not found", id)))?;

    Ok(Json(ContentView::from(record)))
}
