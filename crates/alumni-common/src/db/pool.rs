use std::str::FromStr;

use deadpool_postgres::{
    Config, CreatePoolError, ManagerConfig, Pool, PoolConfig, PoolError, RecyclingMethod, Runtime,
};
use thiserror::Error;
use tokio_postgres::NoTls;
use tracing::info;

pub type PgPool = Pool;

const DEFAULT_POOL_SIZE: usize = 16;

#[derive(Debug, Error)]
pub enum DbPoolError {
    #[error("invalid database url: {0}")]
    InvalidConfig(String),
    #[error("failed to create database pool: {0}")]
    PoolCreation(#[from] CreatePoolError),
    #[error("database unreachable: {0}")]
    Unreachable(#[from] PoolError),
}

/// Builds a pool without opening any connection.
pub fn create_pool_from_url(db_url: &str) -> Result<PgPool, DbPoolError> {
    create_pool_with_size(db_url, pool_size_from_env())
}

pub fn create_pool_with_size(db_url: &str, max_size: usize) -> Result<PgPool, DbPoolError> {
    tokio_postgres::Config::from_str(db_url)
        .map_err(|e| DbPoolError::InvalidConfig(e.to_string()))?;

    let mut cfg = Config::new();
    cfg.url = Some(db_url.to_string());
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });
    cfg.pool = Some(PoolConfig::new(max_size.max(1)));

    Ok(cfg.create_pool(Some(Runtime::Tokio1), NoTls)?)
}

/// Builds a pool and checks out one connection so startup fails fast on a
/// bad URL or an unreachable server.
pub async fn create_pool_from_url_checked(db_url: &str) -> Result<PgPool, DbPoolError> {
    let pool = create_pool_from_url(db_url)?;
    let client = pool.get().await?;
    drop(client);

    info!(max_size = pool.status().max_size, "database pool ready");
    Ok(pool)
}

fn pool_size_from_env() -> usize {
    std::env::var("ALUMNI_DB_POOL_SIZE")
        .ok()
        .and_then(|raw| raw.parse::<usize>().ok())
        .filter(|size| *size > 0)
        .unwrap_or(DEFAULT_POOL_SIZE)
}
