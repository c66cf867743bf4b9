#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::{anyhow, Context};
use authdata_inspector::{handlers::configure_services, InspectorSettings, VERSION};
use log::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from Settings.toml and environment variables
    // This also loads .env file and initializes the logger
    let settings = InspectorSettings::load().map_err(|e| anyhow!("Failed to load settings: {e}"))?;

    start_server(settings).await
}

/// Start the HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(settings: InspectorSettings) -> anyhow::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address);

    let cors_origins = settings.get_cors_origins();
    let payload_limit = settings.decoder.max_payload_bytes;

    HttpServer::new(move || {
        let cors_origins = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                cors_origins
                    .iter()
                    .any(|allowed| allowed == origin.to_str().unwrap_or(""))
            })
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec!["Content-Type", "Accept"])
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(settings.clone()))
            .app_data(web::JsonConfig::default().limit(payload_limit))
            .wrap(cors)
            .wrap(Logger::default())
            .configure(configure_services)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {bind_address}"))?
    .run()
    .await
    .context("Server terminated with an error")
}

fn print_startup_info(bind_address: &str) {
    info!("Starting authdata-inspector {VERSION} on http://{bind_address}");
    println!("Decode endpoints:");
    println!("  POST /decode/registration       - Registration response (attestation)");
    println!("  POST /decode/authentication     - Authentication response (assertion)");
    println!("  POST /decode/authenticator-data - Standalone authenticator data");
    println!("  POST /decode/client-data        - Standalone clientDataJSON");
    println!();
    println!("System endpoints:");
    println!("  GET  /ping                      - Health check");
}
