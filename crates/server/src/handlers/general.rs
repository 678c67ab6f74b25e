//! Root and health handlers for both servers.

use crate::state::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::warn;

pub async fn direct_root() -> &'static str {
    "ledgerqa direct server is running."
}

pub async fn agent_root() -> &'static str {
    "ledgerqa agent server is running."
}

/// Health for the direct server: per-dependency status plus a cheap
/// connectivity probe against the warehouse.
pub async fn direct_health(State(state): State<AppState>) -> Json<Value> {
    let ai_ok = state.client.is_some();
    let bq_ok = state.storage_available;
    let mut overall_ok = ai_ok && bq_ok;

    let connectivity = match (&state.client, bq_ok) {
        (Some(client), true) => match client.execute("SELECT 1").await {
            Ok(_) => "ok".to_string(),
            Err(e) => {
                warn!("Health check BigQuery connectivity error: {e}");
                overall_ok = false;
                "error".to_string()
            }
        },
        _ => "not_tested (client unavailable)".to_string(),
    };

    Json(json!({
        "status": if overall_ok { "ok" } else { "error" },
        "services": {
            "bigquery_client": if bq_ok { "ok" } else { "unavailable" },
            "ai_provider": if ai_ok { "ok" } else { "unavailable" },
            "bigquery_connectivity": connectivity,
            "sql_generation_temperature": state.config.sql_generation_temperature,
            "summary_generation_temperature": state.config.summary_generation_temperature,
        }
    }))
}

/// Health for the agent server: agent reachability plus the secondary
/// reasoning dependency.
pub async fn agent_health(State(state): State<AppState>) -> Json<Value> {
    let agent_ok = state.agent.is_some();
    let reasoning_ok = state.client.is_some();

    Json(json!({
        "status": if agent_ok && reasoning_ok { "ok" } else { "error" },
        "services": {
            "data_query_service_status": if agent_ok { "ok" } else { "unavailable" },
            "secondary_reasoning_service_status": if reasoning_ok { "ok" } else { "unavailable" },
        }
    }))
}
