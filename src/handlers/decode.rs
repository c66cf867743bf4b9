//! Decode request handlers
//!
//! Each handler decodes one kind of client payload and answers with the
//! decoded structure as JSON, or a `400` describing the first failure.

use actix_web::{http::header, web, HttpResponse};
use log::{debug, warn};
use serde::Serialize;

use crate::models::{AuthenticatorDataRequest, ClientDataRequest, ErrorResponse};
use crate::settings::InspectorSettings;
use crate::webauthn::{
    AuthenticationResponse, AuthenticatorData, ClientData, RegistrationResponse, WebAuthnError,
};

/// Convert `WebAuthnError` to HTTP response
fn error_to_response(error: &WebAuthnError) -> HttpResponse {
    warn!("Decoding failed: {error}");
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.code().to_string(),
        message: error.to_string(),
    })
}

/// Serialize a decoded value honoring the `pretty_json` setting
fn json_response<T: Serialize>(value: &T, settings: &InspectorSettings) -> HttpResponse {
    let body = if settings.decoder.pretty_json {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match body {
        Ok(body) => HttpResponse::Ok()
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .body(body),
        Err(e) => HttpResponse::InternalServerError().json(ErrorResponse {
            error: "internal_error".to_string(),
            message: format!("Failed to serialize decoded value: {e}"),
        }),
    }
}

fn respond<T: Serialize>(
    result: Result<T, WebAuthnError>,
    settings: &InspectorSettings,
) -> HttpResponse {
    match result {
        Ok(decoded) => json_response(&decoded, settings),
        Err(e) => error_to_response(&e),
    }
}

/// Decode a registration response (`navigator.credentials.create()`)
pub async fn decode_registration(
    body: web::Json<RegistrationResponse>,
    settings: web::Data<InspectorSettings>,
) -> HttpResponse {
    debug!("Registration decode requested");
    respond(body.decode(), &settings)
}

/// Decode an authentication response (`navigator.credentials.get()`)
pub async fn decode_authentication(
    body: web::Json<AuthenticationResponse>,
    settings: web::Data<InspectorSettings>,
) -> HttpResponse {
    debug!("Authentication decode requested");
    respond(body.decode(), &settings)
}

/// Decode a standalone authenticator data string
pub async fn decode_authenticator_data(
    body: web::Json<AuthenticatorDataRequest>,
    settings: web::Data<InspectorSettings>,
) -> HttpResponse {
    respond(
        AuthenticatorData::parse_base64url(&body.authenticator_data),
        &settings,
    )
}

/// Decode a standalone client data JSON string
pub async fn decode_client_data(
    body: web::Json<ClientDataRequest>,
    settings: web::Data<InspectorSettings>,
) -> HttpResponse {
    respond(ClientData::decode_base64url(&body.client_data_json), &settings)
}
