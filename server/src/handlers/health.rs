use actix_web::{get, HttpResponse};
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: &'static str,
}

/// Liveness only. Never touches the document store or the identity provider.
#[get("/health")]
pub async fn health_check() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(HealthCheckResponse { status: "ok" }))
}
