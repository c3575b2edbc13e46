#![allow(async_fn_in_trait)]

use std::{sync::OnceLock, time::Instant};

use deadpool_postgres::GenericClient;
use tokio_postgres::{Row, types::ToSql};
use tracing::warn;

fn parse_threshold(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .map(|ms| ms.max(0) as u64)
        .filter(|ms| *ms > 0)
}

fn slow_query_threshold_ms() -> Option<u64> {
    static THRESHOLD: OnceLock<Option<u64>> = OnceLock::new();

    *THRESHOLD.get_or_init(|| {
        parse_threshold(std::env::var("ALUMNI_DB_LOG_MIN_DURATION_MS").ok().as_deref())
    })
}

fn log_if_slow(label: &str, started_at: Instant) {
    let Some(threshold_ms) = slow_query_threshold_ms() else {
        return;
    };

    let elapsed_ms = started_at.elapsed().as_millis() as u64;
    if elapsed_ms >= threshold_ms {
        warn!(query = label, elapsed_ms, threshold_ms, "slow query");
    }
}

/// Prepared-statement queries that warn when they exceed
/// `ALUMNI_DB_LOG_MIN_DURATION_MS`.
pub trait TimedClientExt: GenericClient {
    async fn timed_query(
        &self,
        statement: &str,
        params: &[&(dyn ToSql + Sync)],
        label: &str,
    ) -> Result<Vec<Row>, tokio_postgres::Error> {
        let started = Instant::now();
        let prepared = self.prepare_cached(statement).await?;
        let result = self.query(&prepared, params).await;
        log_if_slow(label, started);
        result
    }

    async fn timed_query_opt(
        &self,
        statement: &str,
        params: &[&(dyn ToSql + Sync)],
        label: &str,
    ) -> Result<Option<Row>, tokio_postgres::Error> {
        let started = Instant::now();
        let prepared = self.prepare_cached(statement).await?;
        let result = self.query_opt(&prepared, params).await;
        log_if_slow(label, started);
        result
    }
}

impl<T: GenericClient + ?Sized> TimedClientExt for T {}
