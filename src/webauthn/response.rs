//! Whole client response decoding
//!
//! Accepts the JSON form of a `PublicKeyCredential` as produced by
//! `credential.toJSON()` and decodes every encoded member for inspection.

use log::debug;
use serde::{Deserialize, Serialize};

use super::attestation::AttestationObject;
use super::authenticator_data::AuthenticatorData;
use super::client_data::ClientData;
use super::encoding;
use super::errors::WebAuthnError;

fn public_key_type() -> String {
    "public-key".to_string()
}

/// Registration response from client
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub id: String, // Base64URL-encoded credential ID
    #[serde(default)]
    pub raw_id: Option<String>,
    #[serde(rename = "type", default = "public_key_type")]
    pub r#type: String, // Always "public-key"
    pub response: AuthenticatorAttestationResponse,
    #[serde(default)]
    pub authenticator_attachment: Option<String>,
    #[serde(default)]
    pub client_extension_results: Option<serde_json::Value>,
}

/// Authentication response from client
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResponse {
    pub id: String,
    #[serde(default)]
    pub raw_id: Option<String>,
    #[serde(rename = "type", default = "public_key_type")]
    pub r#type: String,
    pub response: AuthenticatorAssertionResponse,
    #[serde(default)]
    pub authenticator_attachment: Option<String>,
    #[serde(default)]
    pub client_extension_results: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorAttestationResponse {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String, // Base64URL-encoded client data JSON
    pub attestation_object: String, // Base64URL-encoded attestation object
    #[serde(default)]
    pub transports: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorAssertionResponse {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    pub authenticator_data: String,
    pub signature: String,
    #[serde(default)]
    pub user_handle: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DecodedRegistration {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_id: Option<String>,
    #[serde(rename = "type")]
    pub r#type: String,
    pub response: DecodedAttestationResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticator_attachment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_extension_results: Option<serde_json::Value>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DecodedAttestationResponse {
    #[serde(rename = "clientDataJSON")]
    pub client_data: ClientData,
    pub attestation_object: AttestationObject,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transports: Vec<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DecodedAuthentication {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_id: Option<String>,
    #[serde(rename = "type")]
    pub r#type: String,
    pub response: DecodedAssertionResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticator_attachment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_extension_results: Option<serde_json::Value>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DecodedAssertionResponse {
    #[serde(rename = "clientDataJSON")]
    pub client_data: ClientData,
    pub authenticator_data: AuthenticatorData,
    #[serde(serialize_with = "encoding::serialize")]
    pub signature: Vec<u8>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "encoding::serialize_option"
    )]
    pub user_handle: Option<Vec<u8>>,
    /// User handle as text, when it is valid UTF-8
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_handle_text: Option<String>,
}

impl RegistrationResponse {
    /// Decode client data and attestation object
    ///
    /// # Errors
    /// Returns the first decoding error of either member
    pub fn decode(&self) -> Result<DecodedRegistration, WebAuthnError> {
        debug!("Decoding registration response for credential {}", self.id);
        let client_data = ClientData::decode_base64url(&self.response.client_data_json)?;
        let attestation_object =
            AttestationObject::decode_base64url(&self.response.attestation_object)?;

        Ok(DecodedRegistration {
            id: self.id.clone(),
            raw_id: self.raw_id.clone(),
            r#type: self.r#type.clone(),
            response: DecodedAttestationResponse {
                client_data,
                attestation_object,
                transports: self.response.transports.clone(),
            },
            authenticator_attachment: self.authenticator_attachment.clone(),
            client_extension_results: self.client_extension_results.clone(),
        })
    }
}

impl AuthenticationResponse {
    /// Decode client data, authenticator data, signature and user handle
    ///
    /// # Errors
    /// Returns the first decoding error of any member
    pub fn decode(&self) -> Result<DecodedAuthentication, WebAuthnError> {
        debug!("Decoding authentication response for credential {}", self.id);
        let response = &self.response;
        let client_data = ClientData::decode_base64url(&response.client_data_json)?;
        let authenticator_data = AuthenticatorData::parse_base64url(&response.authenticator_data)?;
        let signature = encoding::decode_base64url(&response.signature, "signature")?;
        let user_handle = response
            .user_handle
            .as_deref()
            .filter(|handle| !handle.is_empty())
            .map(|handle| encoding::decode_base64url(handle, "user handle"))
            .transpose()?;
        let user_handle_text = user_handle
            .as_ref()
            .and_then(|handle| String::from_utf8(handle.clone()).ok());

        Ok(DecodedAuthentication {
            id: self.id.clone(),
            raw_id: self.raw_id.clone(),
            r#type: self.r#type.clone(),
            response: DecodedAssertionResponse {
                client_data,
                authenticator_data,
                signature,
                user_handle,
                user_handle_text,
            },
            authenticator_attachment: self.authenticator_attachment.clone(),
            client_extension_results: self.client_extension_results.clone(),
        })
    }
}
