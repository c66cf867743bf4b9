//! Client data JSON decoding
//!
//! Decodes `response.clientDataJSON` into its members. Challenge and origin are
//! reported as-is; comparing them against expectations is the caller's job.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::encoding;
use super::errors::WebAuthnError;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientData {
    #[serde(rename = "type")]
    pub r#type: String, // "webauthn.create" or "webauthn.get"
    pub challenge: String, // Base64URL-encoded challenge
    pub origin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_origin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_binding: Option<TokenBinding>,
    /// Members not defined by the `WebAuthn` specification
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TokenBinding {
    pub status: String, // "present", "supported" or "not-supported"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ClientData {
    /// Decode raw client data JSON bytes
    ///
    /// # Errors
    /// Returns `InvalidClientData` if the bytes are not JSON or lack a required member
    pub fn decode(bytes: &[u8]) -> Result<Self, WebAuthnError> {
        serde_json::from_slice(bytes)
            .map_err(|e| WebAuthnError::InvalidClientData(format!("Invalid client data JSON: {e}")))
    }

    /// Decode base64url client data JSON
    ///
    /// # Errors
    /// Returns `EncodingError` for invalid base64url, otherwise as [`Self::decode`]
    pub fn decode_base64url(text: &str) -> Result<Self, WebAuthnError> {
        Self::decode(&encoding::decode_base64url(text, "client data")?)
    }

    /// Whether this client data came from a registration ceremony
    #[must_use]
    pub fn is_registration(&self) -> bool {
        self.r#type == "webauthn.create"
    }
}
