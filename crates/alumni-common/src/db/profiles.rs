use std::collections::HashMap;

use deadpool_postgres::PoolError;
use tokio_postgres::{Error as PgError, Row};
use tracing::instrument;

use crate::Profile;
use crate::api::alumni::{AlumnusDetail, AlumnusSummary, ProfileCompletion, placeholder_email};
use crate::db::PgPool;
use crate::db::util::TimedClientExt;

#[derive(Debug, thiserror::Error)]
pub enum ProfileFetchError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
}

const SUMMARY_COLUMNS: &str = "a.id, a.name, a.major, a.city, a.graduation_year, a.photo_file";

fn summary_from_row(row: &Row) -> AlumnusSummary {
    AlumnusSummary {
        id: row.get("id"),
        name: row.get("name"),
        major: row.get("major"),
        city: row.get("city"),
        graduation_year: row.get("graduation_year"),
        photo_file: row.get("photo_file"),
    }
}

/// Every alumnus as a recommender input, ordered by id so the batch order is
/// stable between requests.
#[instrument(skip(pool))]
pub async fn fetch_profiles(pool: &PgPool) -> Result<Vec<Profile>, ProfileFetchError> {
    let client = pool.get().await?;
    let rows = client
        .timed_query(
            "SELECT id, major, city, graduation_year FROM alumni.alumni ORDER BY id",
            &[],
            "fetch_profiles",
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| Profile {
            id: row.get("id"),
            major: row.get("major"),
            city: row.get("city"),
            graduation_year: row.get("graduation_year"),
        })
        .collect())
}

#[instrument(skip(pool))]
pub async fn fetch_alumnus(
    pool: &PgPool,
    alumni_id: i64,
) -> Result<Option<AlumnusDetail>, ProfileFetchError> {
    let client = pool.get().await?;
    let row = client
        .timed_query_opt(
            "SELECT a.id, a.name, a.major, a.city, a.graduation_year, a.phone_number, \
                    a.linkedin_id, a.photo_file, a.profile_complete, a.institute_id, \
                    acc.email \
             FROM alumni.alumni a \
             LEFT JOIN alumni.accounts acc ON acc.alumni_id = a.id \
             WHERE a.id = $1",
            &[&alumni_id],
            "fetch_alumnus",
        )
        .await?;

    Ok(row.map(|row| {
        let linkedin_id: Option<String> = row.get("linkedin_id");
        let email: Option<String> = row.get("email");

        AlumnusDetail {
            id: row.get("id"),
            name: row.get("name"),
            major: row.get("major"),
            city: row.get("city"),
            graduation_year: row.get("graduation_year"),
            phone_number: row.get("phone_number"),
            photo_file: row.get("photo_file"),
            profile_complete: row.get("profile_complete"),
            institute_id: row.get("institute_id"),
            email: email.unwrap_or_else(|| placeholder_email(linkedin_id.as_deref())),
            linkedin_id,
        }
    }))
}

/// Stores the contact fields and marks the profile complete. `None` when the
/// alumnus does not exist. A missing photo keeps the current one.
#[instrument(skip(pool, completion))]
pub async fn complete_profile(
    pool: &PgPool,
    alumni_id: i64,
    completion: &ProfileCompletion,
) -> Result<Option<AlumnusDetail>, ProfileFetchError> {
    let updated = {
        let client = pool.get().await?;
        client
            .timed_query_opt(
                "UPDATE alumni.alumni \
                 SET major = $2, city = $3, phone_number = $4, linkedin_id = $5, \
                     photo_file = COALESCE($6, photo_file), profile_complete = TRUE \
                 WHERE id = $1 \
                 RETURNING id",
                &[
                    &alumni_id,
                    &completion.major,
                    &completion.city,
                    &completion.phone_number,
                    &completion.linkedin_id,
                    &completion.photo_file,
                ],
                "complete_profile",
            )
            .await?
    };

    if updated.is_none() {
        return Ok(None);
    }

    fetch_alumnus(pool, alumni_id).await
}

/// Summaries for `ids`, returned in the order of `ids`. Unknown ids are skipped.
#[instrument(skip(pool, ids), fields(requested = ids.len()))]
pub async fn fetch_alumni_by_ids(
    pool: &PgPool,
    ids: &[i64],
) -> Result<Vec<AlumnusSummary>, ProfileFetchError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let client = pool.get().await?;
    let query = format!("SELECT {SUMMARY_COLUMNS} FROM alumni.alumni a WHERE a.id = ANY($1)");
    let ids_param: Vec<i64> = ids.to_vec();
    let rows = client
        .timed_query(&query, &[&ids_param], "fetch_alumni_by_ids")
        .await?;

    Ok(order_by_ids(ids, rows.iter().map(summary_from_row).collect()))
}

fn order_by_ids(ids: &[i64], summaries: Vec<AlumnusSummary>) -> Vec<AlumnusSummary> {
    let mut by_id: HashMap<i64, AlumnusSummary> =
        summaries.into_iter().map(|s| (s.id, s)).collect();

    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

/// Directory page, newest graduating class first.
#[instrument(skip(pool))]
pub async fn list_alumni(
    pool: &PgPool,
    year: Option<i32>,
    limit: i64,
    offset: i64,
) -> Result<Vec<AlumnusSummary>, ProfileFetchError> {
    let client = pool.get().await?;
    let query = format!(
        "SELECT {SUMMARY_COLUMNS} FROM alumni.alumni a \
         WHERE ($1::INTEGER IS NULL OR a.graduation_year = $1) \
         ORDER BY a.graduation_year DESC, a.id \
         LIMIT $2 OFFSET $3"
    );
    let rows = client
        .timed_query(&query, &[&year, &limit, &offset], "list_alumni")
        .await?;

    Ok(rows.iter().map(summary_from_row).collect())
}

/// Distinct graduation years, newest first.
#[instrument(skip(pool))]
pub async fn graduation_years(pool: &PgPool) -> Result<Vec<i32>, ProfileFetchError> {
    let client = pool.get().await?;
    let rows = client
        .timed_query(
            "SELECT DISTINCT graduation_year FROM alumni.alumni ORDER BY graduation_year DESC",
            &[],
            "graduation_years",
        )
        .await?;

    Ok(rows.iter().map(|row| row.get(0)).collect())
}
