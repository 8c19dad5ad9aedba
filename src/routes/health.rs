use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use serde_json::json;

/// Service name reported by the health check, taken from `APP_NAME`.
#[derive(Debug, Clone)]
pub struct ServiceName(pub String);

/// Liveness check. Not enveloped and not authenticated.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is up"))
)]
#[get("/health")]
pub async fn health(name: web::Data<ServiceName>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": name.0,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now()
    }))
}
