// HTTP request handlers for the inspector
pub mod decode;
pub mod health;


use actix_web::web;

// Re-export the main handler functions
pub use decode::{
    decode_authentication, decode_authenticator_data, decode_client_data, decode_registration,
};
pub use health::health;

/// Register every route; shared by the server and the handler tests
pub fn configure_services(cfg: &mut web::ServiceConfig) {
    cfg.route("/decode/registration", web::post().to(decode_registration))
        .route("/decode/authentication", web::post().to(decode_authentication))
        .route(
            "/decode/authenticator-data",
            web::post().to(decode_authenticator_data),
        )
        .route("/decode/client-data", web::post().to(decode_client_data))
        // Health endpoint
        .route("/ping", web::get().to(health));
}
