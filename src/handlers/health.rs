use crate::models::HealthResponse;
use actix_web::{HttpResponse, Result};

/// Health check endpoint
///
/// # Errors
/// Returns an error if health status cannot be determined
pub async fn health() -> Result<HttpResponse> {
    let response = HealthResponse {
        status: "ok".to_string(),
        message: "WebAuthn authenticator data inspector is running".to_string(),
    };
    Ok(HttpResponse::Ok().json(response))
}
