use std::sync::atomic::Ordering;

use axum::{Json, extract::State};
use serde_json::{Value, json};
use tokio::time::{Duration, timeout};

use crate::SharedState;
use crate::error::ApiError;

const READINESS_TIMEOUT: Duration = Duration::from_secs(1);

pub async fn livez() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Ready while the server is not draining and Postgres answers `SELECT 1`.
pub async fn readyz(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    if !state.readiness.load(Ordering::SeqCst) {
        return Err(ApiError::ServiceUnavailable("shutting_down".into()));
    }

    let client = timeout(READINESS_TIMEOUT, state.pool.get())
        .await
        .map_err(|_| ApiError::ServiceUnavailable("db_pool_timeout".into()))?
        .map_err(|err| ApiError::ServiceUnavailable(format!("pool checkout failed: {err}")))?;

    timeout(READINESS_TIMEOUT, client.simple_query("SELECT 1"))
        .await
        .map_err(|_| ApiError::ServiceUnavailable("db_ping_timeout".into()))?
        .map_err(|err| ApiError::ServiceUnavailable(format!("db ping failed: {err}")))?;

    Ok(Json(json!({
        "status": "ok",
        "database": "ok",
        "application": env!("CARGO_PKG_NAME"),
    })))
}
