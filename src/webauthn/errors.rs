//! `WebAuthn` decoding error types
//!
//! This module defines the error taxonomy shared by every decoder in the crate.
//! Unknown key-type or algorithm codes are not errors; they surface as raw codes.

use std::fmt;

use thiserror::Error;

/// Fixed or length-prefixed field of the authenticator data layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDataField {
    RpIdHash,
    Flags,
    Counter,
    Aaguid,
    CredentialIdLength,
    CredentialId,
    CredentialPublicKey,
}

impl fmt::Display for AuthDataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthDataField::RpIdHash => "rpIdHash",
            AuthDataField::Flags => "flags",
            AuthDataField::Counter => "counter",
            AuthDataField::Aaguid => "aaguid",
            AuthDataField::CredentialIdLength => "credentialIdLength",
            AuthDataField::CredentialId => "credentialId",
            AuthDataField::CredentialPublicKey => "credentialPublicKey",
        };
        f.write_str(name)
    }
}

/// `WebAuthn` errors that can occur while decoding
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebAuthnError {
    /// Fewer bytes remain than the field requires
    #[error("Truncated buffer while reading {field}: needed {needed} bytes, {available} available")]
    TruncatedBuffer {
        field: AuthDataField,
        needed: usize,
        available: usize,
    },

    /// The COSE public key region could not be decoded
    #[error("Invalid COSE structure: {0}")]
    InvalidCoseStructure(String),

    /// The selected key variant requires a label that is absent
    #[error("Missing label {label} in {variant} public key")]
    MissingKeyField { variant: &'static str, label: i64 },

    /// Data encoding error (base64url, UTF-8)
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// Attestation object is not the expected CBOR map
    #[error("Invalid attestation object: {0}")]
    InvalidAttestationObject(String),

    /// Client data JSON is malformed or incomplete
    #[error("Invalid client data: {0}")]
    InvalidClientData(String),

    /// An x5c certificate could not be parsed
    #[error("Invalid certificate at index {index}: {message}")]
    InvalidCertificate { index: usize, message: String },
}

impl WebAuthnError {
    /// Stable snake_case code used at the HTTP boundary
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            WebAuthnError::TruncatedBuffer { .. } => "truncated_buffer",
            WebAuthnError::InvalidCoseStructure(_) => "invalid_cose_structure",
            WebAuthnError::MissingKeyField { .. } => "missing_key_field",
            WebAuthnError::EncodingError(_) => "encoding_error",
            WebAuthnError::InvalidAttestationObject(_) => "invalid_attestation_object",
            WebAuthnError::InvalidClientData(_) => "invalid_client_data",
            WebAuthnError::InvalidCertificate { .. } => "invalid_certificate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_buffer_names_field() {
        let err = WebAuthnError::TruncatedBuffer {
            field: AuthDataField::Counter,
            needed: 4,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "Truncated buffer while reading counter: needed 4 bytes, 2 available"
        );
        assert_eq!(err.code(), "truncated_buffer");
    }

    #[test]
    fn test_missing_key_field_message() {
        let err = WebAuthnError::MissingKeyField {
            variant: "RSA",
            label: -2,
        };
        assert_eq!(err.to_string(), "Missing label -2 in RSA public key");
    }
}
