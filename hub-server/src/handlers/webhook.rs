//! Refresh webhook handlers

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;
use xql_hub_core::{RefreshStatus, RefreshTrigger, TriggerOutcome};

use crate::{AppResult, AppState};

pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";
pub const EVENT_HEADER: &str = "x-github-event";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Verify, pull and reload on a signed push
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let refresh_id = Uuid::new_v4();
    let trigger = RefreshTrigger {
        payload: &body,
        signature: header(&headers, SIGNATURE_HEADER),
        event: header(&headers, EVENT_HEADER),
    };

    tracing::info!(
        %refresh_id,
        event = trigger.event.unwrap_or("-"),
        bytes = body.len(),
        "Refresh trigger received"
    );

    let outcome = state.refresh.handle(trigger).await.map_err(|e| {
        tracing::warn!(%refresh_id, "Refresh trigger not applied: {}", e.redacted());
        e
    })?;

    let body = match outcome {
        TriggerOutcome::Ignored { event } => json!({
            "status": "ignored",
            "message": format!("Event '{}' is not processed", event),
        }),
        TriggerOutcome::Pong => json!({
            "status": "success",
            "message": "Webhook configured successfully",
        }),
        TriggerOutcome::Refreshed(summary) => {
            tracing::info!(
                %refresh_id,
                branch = %summary.branch,
                generation = summary.generation,
                records = summary.records_loaded,
                "Content refreshed"
            );
            json!({
                "status": "success",
                "message": "Content updated",
                "branch": summary.branch,
                "git_output": summary.git_output,
                "generation": summary.generation,
                "records_loaded": summary.records_loaded,
                "load_errors": summary.load_errors,
                "duration_ms": summary.duration_ms,
                "refresh_id": refresh_id,
            })
        }
    };

    Ok(Json(body))
}

/// Current refresh controller state
pub async fn status(State(state): State<AppState>) -> Json<RefreshStatus> {
    Json(state.refresh.status())
}
