/// Health endpoints: summary, readiness (store ping) and liveness
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

use crate::state::AppContext;

#[derive(Serialize, Clone)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    status: ComponentStatus,
    checks: HashMap<String, ComponentCheck>,
    timestamp: String,
}

pub async fn health_summary(ctx: web::Data<AppContext>) -> HttpResponse {
    match ctx.store.ping().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "blog-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("Document store unavailable: {}", e),
            "service": "blog-service"
        })),
    }
}

pub async fn readiness(ctx: web::Data<AppContext>) -> HttpResponse {
    let mut checks = HashMap::new();

    let start = Instant::now();
    let result = ctx.store.ping().await;
    let latency_ms = Some(start.elapsed().as_millis() as u64);
    let ready = result.is_ok();

    let store_check = match result {
        Ok(_) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: format!("{} store reachable", ctx.store.name()),
            latency_ms,
        },
        Err(e) => ComponentCheck {
            status: ComponentStatus::Unhealthy,
            message: format!("{} store check failed: {}", ctx.store.name(), e),
            latency_ms,
        },
    };
    checks.insert("document_store".to_string(), store_check);

    let response = ReadinessResponse {
        ready,
        status: if ready {
            ComponentStatus::Healthy
        } else {
            ComponentStatus::Unhealthy
        },
        checks,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}
