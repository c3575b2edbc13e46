use deadpool_postgres::PoolError;
use thiserror::Error;
use tokio_postgres::Error as PgError;
use tracing::{info, instrument};

use crate::db::PgPool;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("failed to run migration: {0}")]
    Postgres(#[from] PgError),
}

struct Migration {
    id: i32,
    description: &'static str,
    sql: &'static str,
}

const BOOTSTRAP: &str = "
CREATE SCHEMA IF NOT EXISTS alumni;
CREATE TABLE IF NOT EXISTS alumni.schema_migrations (
    id INTEGER PRIMARY KEY,
    description TEXT NOT NULL,
    applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);";

const MIGRATIONS: &[Migration] = &[
    Migration {
        id: 1,
        description: "institutes, alumni and events",
        sql: r#"
CREATE TABLE IF NOT EXISTS alumni.institutes (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(100) NOT NULL UNIQUE,
    logo_path VARCHAR(255) NOT NULL DEFAULT 'logo.png'
);

CREATE TABLE IF NOT EXISTS alumni.alumni (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    major VARCHAR(100),
    city VARCHAR(100),
    graduation_year INTEGER NOT NULL,
    phone_number VARCHAR(20),
    linkedin_id VARCHAR(100),
    photo_file VARCHAR(100) NOT NULL DEFAULT 'default_user.png',
    profile_complete BOOLEAN NOT NULL DEFAULT FALSE,
    institute_id BIGINT REFERENCES alumni.institutes(id)
);

CREATE INDEX IF NOT EXISTS idx_alumni_name ON alumni.alumni(name);
CREATE INDEX IF NOT EXISTS idx_alumni_graduation_year ON alumni.alumni(graduation_year);

CREATE TABLE IF NOT EXISTS alumni.events (
    id BIGSERIAL PRIMARY KEY,
    title VARCHAR(100) NOT NULL,
    description TEXT,
    date_time TIMESTAMPTZ NOT NULL,
    location VARCHAR(100),
    institute_id BIGINT REFERENCES alumni.institutes(id)
);
"#,
    },
    Migration {
        id: 2,
        description: "account email lookup for profile pages",
        sql: r#"
CREATE TABLE IF NOT EXISTS alumni.accounts (
    id BIGSERIAL PRIMARY KEY,
    email VARCHAR(120) NOT NULL UNIQUE,
    alumni_id BIGINT UNIQUE REFERENCES alumni.alumni(id)
);

CREATE INDEX IF NOT EXISTS idx_events_date_time ON alumni.events(date_time);
"#,
    },
];

/// Applies pending migrations in id order, each in its own transaction.
#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    let mut client = pool.get().await?;
    client.batch_execute(BOOTSTRAP).await?;

    for migration in MIGRATIONS {
        let applied: bool = client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM alumni.schema_migrations WHERE id = $1)",
                &[&migration.id],
            )
            .await?
            .get(0);

        if applied {
            continue;
        }

        let tx = client.transaction().await?;
        tx.batch_execute(migration.sql).await?;
        tx.execute(
            "INSERT INTO alumni.schema_migrations (id, description) VALUES ($1, $2)",
            &[&migration.id, &migration.description],
        )
        .await?;
        tx.commit().await?;

        info!(
            id = migration.id,
            description = migration.description,
            "applied migration"
        );
    }

    Ok(())
}
