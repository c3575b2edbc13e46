use std::sync::OnceLock;
use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub const RECOMMENDATIONS_TOTAL: &str = "alumni_recommendations_total";
pub const RECOMMENDATION_SECONDS: &str = "alumni_recommendation_seconds";

/// How a recommendation request ended, used as the `outcome` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationOutcome {
    Served,
    NotEnoughData,
    TargetMissing,
    Failed,
}

impl RecommendationOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            RecommendationOutcome::Served => "served",
            RecommendationOutcome::NotEnoughData => "not_enough_data",
            RecommendationOutcome::TargetMissing => "target_missing",
            RecommendationOutcome::Failed => "failed",
        }
    }
}

pub fn record_recommendation(outcome: RecommendationOutcome, elapsed: Duration) {
    metrics::counter!(RECOMMENDATIONS_TOTAL, "outcome" => outcome.as_str()).increment(1);
    metrics::histogram!(RECOMMENDATION_SECONDS).record(elapsed.as_secs_f64());
}

fn resolve_port(raw: Option<&str>, default_port: u16) -> u16 {
    raw.and_then(|value| value.trim().parse::<u16>().ok())
        .unwrap_or(default_port)
}

/// Starts a Prometheus exporter on `0.0.0.0:<port>`, where the port comes from
/// `port_env` or `default_port`. Must run inside a tokio runtime; the exporter
/// is spawned onto it. Calling it again returns the existing handle.
pub fn init_metrics(port_env: &str, default_port: u16) -> Option<&'static PrometheusHandle> {
    if let Some(existing) = PROMETHEUS_HANDLE.get() {
        return Some(existing);
    }

    let port = resolve_port(std::env::var(port_env).ok().as_deref(), default_port);

    let (recorder, exporter) = match PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .build()
    {
        Ok(parts) => parts,
        Err(err) => {
            warn!(error = %err, metrics_port = port, "prometheus exporter not started");
            return None;
        }
    };

    let handle = recorder.handle();
    if let Err(err) = metrics::set_global_recorder(recorder) {
        warn!(error = %err, "a metrics recorder is already installed");
        return None;
    }

    tokio::spawn(async move {
        if exporter.await.is_err() {
            warn!(metrics_port = port, "prometheus exporter stopped");
        }
    });

    info!(metrics_port = port, "prometheus exporter listening");
    let _ = PROMETHEUS_HANDLE.set(handle);
    PROMETHEUS_HANDLE.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_labels_are_snake_case() {
        assert_eq!(RecommendationOutcome::Served.as_str(), "served");
        assert_eq!(RecommendationOutcome::NotEnoughData.as_str(), "not_enough_data");
        assert_eq!(RecommendationOutcome::TargetMissing.as_str(), "target_missing");
        assert_eq!(RecommendationOutcome::Failed.as_str(), "failed");
    }

    #[test]
    fn port_falls_back_on_garbage() {
        assert_eq!(resolve_port(Some("9200"), 9100), 9200);
        assert_eq!(resolve_port(Some("http"), 9100), 9100);
        assert_eq!(resolve_port(None, 9100), 9100);
    }

    #[test]
    fn recording_without_recorder_is_a_no_op() {
        record_recommendation(RecommendationOutcome::Served, Duration::from_millis(3));
    }

    #[tokio::test]
    async fn exporter_installs_once_and_renders_recommendations() {
        let first = init_metrics("ALUMNI_METRICS_PORT_UNSET_IN_TESTS", 0)
            .expect("exporter should start on an ephemeral port");
        let second = init_metrics("ALUMNI_METRICS_PORT_UNSET_IN_TESTS", 0)
            .expect("second call reuses the handle");
        assert!(std::ptr::eq(first, second));

        record_recommendation(RecommendationOutcome::NotEnoughData, Duration::from_millis(1));

        let rendered = first.render();
        assert!(rendered.contains(RECOMMENDATIONS_TOTAL));
        assert!(rendered.contains("outcome=\"not_enough_data\""));
    }
}
