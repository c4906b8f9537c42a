//! Prometheus metrics for blog-service.
//!
//! Exposes request, authorization and upload collectors and an HTTP handler
//! for the `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static! {
    /// HTTP requests handled, by method and response status.
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total HTTP requests segmented by method and status",
        &["method", "status"]
    )
    .expect("failed to register http_requests_total");

    /// Ownership checks on mutating operations (allowed/denied).
    pub static ref OWNERSHIP_DECISIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "ownership_decisions_total",
        "Ownership decisions segmented by action and outcome",
        &["action", "outcome"]
    )
    .expect("failed to register ownership_decisions_total");

    /// Image uploads to the asset host (success/error).
    pub static ref ASSET_UPLOADS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "asset_uploads_total",
        "Asset uploads segmented by result",
        &["result"]
    )
    .expect("failed to register asset_uploads_total");
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
