use std::collections::HashSet;
use std::time::Instant;

use alumni_common::api::{AlumnusDetail, RecommendationResponse};
use alumni_common::api::recommendation::{NOT_ENOUGH_DATA, RECOMMENDATIONS_UNAVAILABLE};
use alumni_common::db::{fetch_alumni_by_ids, fetch_alumnus, fetch_profiles};
use alumni_common::{Profile, RecommendError, recommend};
use alumni_metrics::{RecommendationOutcome, record_recommendation};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::SharedState;
use crate::auth::AuthUser;
use crate::error::ApiError;

pub const PROFILE_INCOMPLETE: &str = "complete_profile_required";

#[derive(Debug, Deserialize, Default)]
pub struct RecommendationQuery {
    pub top_k: Option<i64>,
}

/// What the recommender produced for one request, before ids are resolved
/// to directory entries.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Selection {
    Ranked(Vec<i64>),
    Empty {
        message: &'static str,
        outcome: RecommendationOutcome,
    },
}

/// Runs the recommender over `profiles` and maps its edge cases onto the
/// messages shown to users.
pub(crate) fn select(alumni_id: i64, profiles: &[Profile], top_k: usize) -> Selection {
    let distinct = profiles.iter().map(|p| p.id).collect::<HashSet<_>>().len();
    if distinct < 2 {
        return Selection::Empty {
            message: NOT_ENOUGH_DATA,
            outcome: RecommendationOutcome::NotEnoughData,
        };
    }

    match recommend(alumni_id, profiles, top_k) {
        Ok(ids) => Selection::Ranked(ids),
        Err(RecommendError::NotFound { target_id }) => {
            warn!(target_id, batch = profiles.len(), "target missing from batch");
            Selection::Empty {
                message: RECOMMENDATIONS_UNAVAILABLE,
                outcome: RecommendationOutcome::TargetMissing,
            }
        }
    }
}

/// Only alumni with a completed profile get recommendations.
pub(crate) fn gate(
    alumni_id: i64,
    alumnus: Option<AlumnusDetail>,
) -> Result<AlumnusDetail, ApiError> {
    let alumnus =
        alumnus.ok_or_else(|| ApiError::NotFound(format!("alumnus {alumni_id} not found")))?;

    if !alumnus.profile_complete {
        return Err(ApiError::Conflict(PROFILE_INCOMPLETE.into()));
    }

    Ok(alumnus)
}

fn outcome_of<T>(
    result: &Result<(T, RecommendationOutcome), ApiError>,
) -> RecommendationOutcome {
    match result {
        Ok((_, outcome)) => *outcome,
        Err(_) => RecommendationOutcome::Failed,
    }
}

pub async fn for_alumnus(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(alumni_id): Path<i64>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    auth.ensure_can_view(alumni_id)?;

    recommendations_for(&state, alumni_id, query.top_k)
        .await
        .map(Json)
}

pub async fn for_current_user(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    let alumni_id = auth.alumni_id()?;

    recommendations_for(&state, alumni_id, query.top_k)
        .await
        .map(Json)
}

#[instrument(skip(state))]
async fn recommendations_for(
    state: &SharedState,
    alumni_id: i64,
    requested_top_k: Option<i64>,
) -> Result<RecommendationResponse, ApiError> {
    let started = Instant::now();

    let result = build_response(state, alumni_id, requested_top_k).await;

    record_recommendation(outcome_of(&result), started.elapsed());

    result.map(|(response, _)| response)
}

async fn build_response(
    state: &SharedState,
    alumni_id: i64,
    requested_top_k: Option<i64>,
) -> Result<(RecommendationResponse, RecommendationOutcome), ApiError> {
    gate(alumni_id, fetch_alumnus(&state.pool, alumni_id).await?)?;

    let top_k = state.recommender.resolve_top_k(requested_top_k);
    let profiles = fetch_profiles(&state.pool).await?;

    match select(alumni_id, &profiles, top_k) {
        Selection::Ranked(ids) => {
            let recommendations = fetch_alumni_by_ids(&state.pool, &ids).await?;
            info!(
                alumni_id,
                top_k,
                returned = recommendations.len(),
                "served recommendations"
            );
            Ok((
                RecommendationResponse::ranked(alumni_id, recommendations),
                RecommendationOutcome::Served,
            ))
        }
        Selection::Empty { message, outcome } => {
            Ok((RecommendationResponse::empty(alumni_id, message), outcome))
        }
    }
}
