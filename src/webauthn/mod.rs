//! `WebAuthn` response decoding
//!
//! This module turns the binary members of `WebAuthn` client responses into
//! typed records for inspection. It does not verify signatures, attestation
//! statements, challenges or origins.

mod attestation;
mod authenticator_data;
#[cfg(feature = "x509")]
mod certificate;
mod client_data;
pub mod cose;
mod cursor;
mod encoding;
mod errors;
mod flags;
mod response;

// Re-exports for public use
pub use attestation::{AttestationObject, AttestationStatement, KNOWN_FORMATS};
pub use authenticator_data::{
    Aaguid, AttestedCredentialData, AuthenticatorData, AAGUID_LEN, RP_ID_HASH_LEN,
};
#[cfg(feature = "x509")]
pub use certificate::CertificateSummary;
pub use client_data::{ClientData, TokenBinding};
pub use cose::{
    CoseCurve, CredentialPublicKey, EcY, EllipticKey, LatticeKey, ResolvedLabel, RsaKey,
};
pub use cursor::ByteCursor;
pub use encoding::{decode_base64url, encode_base64url};
pub use errors::{AuthDataField, WebAuthnError};
pub use flags::AuthenticatorFlags;
pub use response::{
    AuthenticationResponse, AuthenticatorAssertionResponse, AuthenticatorAttestationResponse,
    DecodedAssertionResponse, DecodedAttestationResponse, DecodedAuthentication,
    DecodedRegistration, RegistrationResponse,
};
