use alumni_common::api::{EventSummary, NewEvent};
use alumni_common::db::{create_event, list_upcoming_events};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::SharedState;
use crate::auth::AuthUser;
use crate::error::ApiError;

const DEFAULT_EVENT_LIMIT: i64 = 20;
const MAX_EVENT_LIMIT: i64 = 100;

#[derive(Debug, Deserialize, Default)]
pub struct EventsQuery {
    pub limit: Option<i64>,
}

pub async fn upcoming(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<EventSummary>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_EVENT_LIMIT)
        .clamp(1, MAX_EVENT_LIMIT);

    let events = list_upcoming_events(&state.pool, Utc::now(), limit).await?;
    Ok(Json(events))
}

/// Institute admins post events; everyone else is turned away before the
/// payload is looked at.
pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(payload): Json<NewEvent>,
) -> Result<(StatusCode, Json<EventSummary>), ApiError> {
    auth.ensure_admin()?;
    let event = payload.validated()?;

    let created = create_event(&state.pool, &event).await?;
    info!(event_id = created.id, institute_id = ?created.institute_id, "event created");

    Ok((StatusCode::CREATED, Json(created)))
}
