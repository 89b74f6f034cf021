//! Health check handler

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use xql_hub_core::logic::taxonomy::TaxonomySource;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    generation: u64,
    queries_loaded: usize,
    load_errors: usize,
    tactics_loaded: usize,
    techniques_loaded: usize,
    taxonomy_source: TaxonomySource,
    loaded_at: DateTime<Utc>,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.store.current();

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        generation: snapshot.generation,
        queries_loaded: snapshot.records.len(),
        load_errors: snapshot.load_errors.len(),
        tactics_loaded: snapshot.taxonomy.tactics.len(),
        techniques_loaded: snapshot.taxonomy.techniques.len(),
        taxonomy_source: snapshot.taxonomy.source,
        loaded_at: snapshot.loaded_at,
    })
}
