#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the inspector
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod handlers;
pub mod models;
pub mod settings;
pub mod webauthn;

// Test utilities for unit tests and for integration tests built with `--features testing`
#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use settings::InspectorSettings;
pub use webauthn::{AuthenticatorData, CredentialPublicKey, WebAuthnError};
