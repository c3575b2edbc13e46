use chrono::{DateTime, Utc};
use deadpool_postgres::PoolError;
use tokio_postgres::{Error as PgError, Row};
use tracing::instrument;

use crate::api::events::{EventSummary, NewEvent};
use crate::db::PgPool;
use crate::db::util::TimedClientExt;

#[derive(Debug, thiserror::Error)]
pub enum EventStorageError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
    #[error("insert returned no row")]
    NotInserted,
}

/// Events starting at or after `now`, soonest first.
#[instrument(skip(pool))]
pub async fn list_upcoming_events(
    pool: &PgPool,
    now: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<EventSummary>, EventStorageError> {
    let client = pool.get().await?;
    let rows = client
        .timed_query(
            "SELECT id, title, description, date_time, location, institute_id \
             FROM alumni.events \
             WHERE date_time >= $1 \
             ORDER BY date_time, id \
             LIMIT $2",
            &[&now, &limit],
            "list_upcoming_events",
        )
        .await?;

    Ok(rows.iter().map(event_from_row).collect())
}

#[instrument(skip(pool, event), fields(institute_id = ?event.institute_id))]
pub async fn create_event(
    pool: &PgPool,
    event: &NewEvent,
) -> Result<EventSummary, EventStorageError> {
    let client = pool.get().await?;
    let rows = client
        .timed_query(
            "INSERT INTO alumni.events (title, description, date_time, location, institute_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, title, description, date_time, location, institute_id",
            &[
                &event.title,
                &event.description,
                &event.date_time,
                &event.location,
                &event.institute_id,
            ],
            "create_event",
        )
        .await?;

    rows.first()
        .map(event_from_row)
        .ok_or(EventStorageError::NotInserted)
}

fn event_from_row(row: &Row) -> EventSummary {
    EventSummary {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        date_time: row.get("date_time"),
        location: row.get("location"),
        institute_id: row.get("institute_id"),
    }
}
