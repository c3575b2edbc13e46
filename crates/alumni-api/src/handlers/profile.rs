use alumni_common::api::{AlumnusDetail, ProfileCompletion};
use alumni_common::db::complete_profile;
use axum::{Json, extract::State};
use tracing::info;

use crate::SharedState;
use crate::auth::AuthUser;
use crate::error::ApiError;

/// Fills in the caller's contact details and unlocks recommendations.
pub async fn complete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(payload): Json<ProfileCompletion>,
) -> Result<Json<AlumnusDetail>, ApiError> {
    let alumni_id = auth.alumni_id()?;
    let completion = payload.validated()?;

    let alumnus = complete_profile(&state.pool, alumni_id, &completion)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("alumnus {alumni_id} not found")))?;

    info!(alumni_id, "profile completed");
    Ok(Json(alumnus))
}
