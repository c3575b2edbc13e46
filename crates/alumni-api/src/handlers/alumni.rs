use alumni_common::api::alumni::parse_year_filter;
use alumni_common::api::{AlumnusDetail, DirectoryResponse};
use alumni_common::db::{fetch_alumnus, graduation_years, list_alumni};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::SharedState;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::pagination::resolve_pagination;

#[derive(Debug, Deserialize, Default)]
pub struct DirectoryQuery {
    /// Kept as text so that a malformed filter is ignored rather than rejected.
    pub year: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn directory(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<DirectoryResponse>, ApiError> {
    let (limit, offset) = resolve_pagination(query.limit, query.offset)?;
    let selected_year = parse_year_filter(query.year.as_deref());

    let alumni = list_alumni(&state.pool, selected_year, limit, offset).await?;
    let years = graduation_years(&state.pool).await?;

    Ok(Json(DirectoryResponse {
        alumni,
        years,
        selected_year,
    }))
}

pub async fn detail(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(alumni_id): Path<i64>,
) -> Result<Json<AlumnusDetail>, ApiError> {
    fetch_alumnus(&state.pool, alumni_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("alumnus {alumni_id} not found")))
}
