use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

/// Requests that matched no route share one label so scanners cannot blow
/// up the series count.
fn route_label(matched_path: Option<&MatchedPath>) -> String {
    matched_path
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string())
}

pub async fn metrics_middleware(
    matched_path: Option<MatchedPath>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let labels = [
        ("method", req.method().to_string()),
        ("route", route_label(matched_path.as_ref())),
    ];

    let response = next.run(req).await;

    let status_class = format!("{}xx", response.status().as_u16() / 100);
    counter!("http_requests_total", &labels).increment(1);
    counter!("http_responses_total", "status_class" => status_class).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());

    response
}

/// Installs the Prometheus recorder and describes the service's own series.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )?
        .install_recorder()?;

    describe_counter!("http_requests_total", "HTTP requests by method and route");
    describe_counter!("http_responses_total", "HTTP responses by status class");
    describe_histogram!("http_request_duration_seconds", "HTTP request latency");
    describe_counter!("swipes_total", "Recorded swipes by action");
    describe_counter!("matches_created_total", "Mutual likes turned into matches");
    describe_counter!("messages_sent_total", "Persisted chat messages");

    tracing::info!("prometheus recorder installed");
    Ok(handle)
}
