use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::llm_client::MODEL;
use crate::state::AppState;

/// GET /health
/// Returns service status, demo mode, token gate usage and dispatch counters.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let gate = state.llm.gate();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "coursegen",
        "model": MODEL,
        "demo_mode": state.llm.is_demo_mode(),
        "token_gate": {
            "capacity": gate.capacity(),
            "consumed": gate.consumed(),
            "remaining": gate.remaining()
        },
        "dispatches": state.llm.counts()
    }))
}
