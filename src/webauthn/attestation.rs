//! Attestation object decoding
//!
//! The attestation object returned by `navigator.credentials.create()` is a
//! CBOR map `{fmt, attStmt, authData}`. The statement is decoded for display
//! only; nothing here verifies it.

use ciborium::de::from_reader;
use ciborium::value::Value;
use log::debug;
use serde::Serialize;

use super::authenticator_data::AuthenticatorData;
#[cfg(feature = "x509")]
use super::certificate::{self, CertificateSummary};
use super::cose::{self, ResolvedLabel};
use super::encoding;
use super::errors::WebAuthnError;

/// Attestation statement formats defined by the `WebAuthn` registry
pub const KNOWN_FORMATS: &[&str] = &[
    "none",
    "packed",
    "fido-u2f",
    "android-key",
    "android-safetynet",
    "tpm",
    "apple",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationObject {
    pub fmt: String,
    pub att_stmt: AttestationStatement,
    pub auth_data: AuthenticatorData,
}

/// Union of the members used by the registered statement formats
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationStatement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<ResolvedLabel>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "encoding::serialize_option"
    )]
    pub sig: Option<Vec<u8>>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "encoding::serialize_list"
    )]
    pub x5c: Vec<Vec<u8>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "encoding::serialize_option"
    )]
    pub ecdaa_key_id: Option<Vec<u8>>,
    /// android-safetynet JWS, as bytes
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "encoding::serialize_option"
    )]
    pub response: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ver: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "encoding::serialize_option"
    )]
    pub cert_info: Option<Vec<u8>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "encoding::serialize_option"
    )]
    pub pub_area: Option<Vec<u8>>,
    /// Readable rendering of `x5c`
    #[cfg(feature = "x509")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub certificates: Vec<CertificateSummary>,
}

impl AttestationObject {
    /// Decode a CBOR attestation object
    ///
    /// # Errors
    /// - `InvalidAttestationObject` if the CBOR or its `fmt`/`attStmt`/`authData`
    ///   members are malformed
    /// - any error from [`AuthenticatorData::parse`]
    /// - `InvalidCertificate` if an `x5c` entry cannot be parsed
    pub fn decode(bytes: &[u8]) -> Result<Self, WebAuthnError> {
        let attestation: Value = from_reader(bytes).map_err(|e| {
            WebAuthnError::InvalidAttestationObject(format!("Invalid CBOR attestation format: {e}"))
        })?;

        let Value::Map(entries) = attestation else {
            return Err(invalid("attestation object is not a map"));
        };

        let fmt = match text_entry(&entries, "fmt") {
            Some(Value::Text(fmt)) => fmt.clone(),
            Some(_) => return Err(invalid("fmt must be text")),
            None => return Err(invalid("missing fmt")),
        };
        if !KNOWN_FORMATS.contains(&fmt.as_str()) {
            debug!("Unregistered attestation format {fmt:?}");
        }

        let att_stmt = match text_entry(&entries, "attStmt") {
            Some(Value::Map(statement)) => AttestationStatement::from_entries(statement)?,
            Some(_) => return Err(invalid("attStmt must be a map")),
            None => return Err(invalid("missing attStmt")),
        };

        let auth_data = match text_entry(&entries, "authData") {
            Some(Value::Bytes(auth_data)) => AuthenticatorData::parse(auth_data)?,
            Some(_) => return Err(invalid("authData must be a byte string")),
            None => return Err(invalid("missing authData")),
        };

        Ok(Self {
            fmt,
            att_stmt,
            auth_data,
        })
    }

    /// Decode a base64url attestation object
    ///
    /// # Errors
    /// Returns `EncodingError` for invalid base64url, otherwise as [`Self::decode`]
    pub fn decode_base64url(text: &str) -> Result<Self, WebAuthnError> {
        Self::decode(&encoding::decode_base64url(text, "attestation object")?)
    }
}

impl AttestationStatement {
    fn from_entries(entries: &[(Value, Value)]) -> Result<Self, WebAuthnError> {
        let alg = match text_entry(entries, "alg") {
            Some(Value::Integer(code)) => Some(cose::resolve_algorithm(
                i64::try_from(*code).map_err(|_| invalid("attStmt.alg is out of range"))?,
            )),
            Some(_) => return Err(invalid("attStmt.alg must be an integer")),
            None => None,
        };

        let x5c = match text_entry(entries, "x5c") {
            Some(Value::Array(certs)) => certs
                .iter()
                .map(|cert| {
                    cert.as_bytes()
                        .cloned()
                        .ok_or_else(|| invalid("attStmt.x5c entries must be byte strings"))
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(invalid("attStmt.x5c must be an array")),
            None => Vec::new(),
        };

        let ver = match text_entry(entries, "ver") {
            Some(Value::Text(ver)) => Some(ver.clone()),
            Some(_) => return Err(invalid("attStmt.ver must be text")),
            None => None,
        };

        Ok(Self {
            alg,
            sig: bytes_entry(entries, "sig")?,
            #[cfg(feature = "x509")]
            certificates: certificate::summarize_chain(&x5c)?,
            x5c,
            ecdaa_key_id: bytes_entry(entries, "ecdaaKeyId")?,
            response: bytes_entry(entries, "response")?,
            ver,
            cert_info: bytes_entry(entries, "certInfo")?,
            pub_area: bytes_entry(entries, "pubArea")?,
        })
    }
}

fn invalid(message: &str) -> WebAuthnError {
    WebAuthnError::InvalidAttestationObject(message.to_string())
}

fn text_entry<'a>(entries: &'a [(Value, Value)], key: &str) -> Option<&'a Value> {
    entries
        .iter()
        .find(|(k, _)| k.as_text() == Some(key))
        .map(|(_, v)| v)
}

fn bytes_entry(entries: &[(Value, Value)], key: &str) -> Result<Option<Vec<u8>>, WebAuthnError> {
    match text_entry(entries, key) {
        Some(Value::Bytes(bytes)) => Ok(Some(bytes.clone())),
        Some(_) => Err(WebAuthnError::InvalidAttestationObject(format!(
            "attStmt.{key} must be a byte string"
        ))),
        None => Ok(None),
    }
}
