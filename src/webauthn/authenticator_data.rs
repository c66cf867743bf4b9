//! Authenticator data parsing
//!
//! Layout:
//! - 32 bytes: RP ID hash
//! - 1 byte: flags
//! - 4 bytes: signature counter (big-endian)
//! - variable: attested credential data (if flag AT, bit 6, is set)
//!   - 16 bytes: AAGUID
//!   - 2 bytes: credential ID length (L)
//!   - L bytes: credential ID
//!   - variable: COSE public key
//! - variable: extensions (if flag ED, bit 7, is set), kept raw

use std::fmt;

use log::{debug, warn};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use super::cose::{self, CoseKeyMap, CredentialPublicKey};
use super::cursor::ByteCursor;
use super::encoding;
use super::errors::{AuthDataField, WebAuthnError};
use super::flags::AuthenticatorFlags;

pub const RP_ID_HASH_LEN: usize = 32;
pub const AAGUID_LEN: usize = 16;

/// Authenticator model identifier
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Aaguid(pub [u8; AAGUID_LEN]);

impl Aaguid {
    /// All-zero AAGUID, reported by authenticators that hide their model
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl fmt::Display for Aaguid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Uuid::from_bytes(self.0).hyphenated())
    }
}

impl fmt::Debug for Aaguid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Aaguid({self})")
    }
}

impl Serialize for Aaguid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Credential data present when the AT flag is set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestedCredentialData {
    pub aaguid: Aaguid,
    #[serde(rename = "credentialID", serialize_with = "encoding::serialize")]
    pub credential_id: Vec<u8>,
    /// Exactly the bytes the COSE key occupied
    #[serde(serialize_with = "encoding::serialize")]
    pub credential_public_key: Vec<u8>,
    /// Omitted when the COSE bytes did not decode to a map
    #[serde(
        rename = "parsedCredentialPublicKey",
        skip_serializing_if = "Option::is_none"
    )]
    pub public_key: Option<CredentialPublicKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorData {
    #[serde(serialize_with = "encoding::serialize")]
    pub rp_id_hash: [u8; RP_ID_HASH_LEN],
    pub flags: AuthenticatorFlags,
    pub counter: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attested_credential_data: Option<AttestedCredentialData>,
    /// Trailing bytes after the structure, not interpreted
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "encoding::serialize_option"
    )]
    pub extensions: Option<Vec<u8>>,
}

impl AuthenticatorData {
    /// Parse one authenticator data structure
    ///
    /// # Errors
    /// - `TruncatedBuffer` naming the field being read if the buffer ends early
    /// - `InvalidCoseStructure` if the credential public key is not valid CBOR
    /// - `MissingKeyField` if the public key lacks a label its key type requires
    pub fn parse(bytes: &[u8]) -> Result<Self, WebAuthnError> {
        let mut cursor = ByteCursor::new(bytes);

        let rp_id_hash = cursor.take_array::<RP_ID_HASH_LEN>(AuthDataField::RpIdHash)?;
        let flags = AuthenticatorFlags::from_byte(cursor.take_u8(AuthDataField::Flags)?);
        let counter = cursor.take_u32_be(AuthDataField::Counter)?;
        debug!("Authenticator data flags: {flags:?}, counter: {counter}");

        let attested_credential_data = if flags.attested_data {
            Some(AttestedCredentialData::parse(&mut cursor)?)
        } else {
            None
        };

        let trailing = cursor.remaining();
        let extensions = if trailing.is_empty() {
            None
        } else {
            if !flags.extension_data {
                warn!(
                    "{} trailing bytes after authenticator data without the extension flag",
                    trailing.len()
                );
            }
            Some(trailing.to_vec())
        };

        Ok(Self {
            rp_id_hash,
            flags,
            counter,
            attested_credential_data,
            extensions,
        })
    }

    /// Parse authenticator data given as base64url text
    ///
    /// # Errors
    /// Returns `EncodingError` for invalid base64url, otherwise as [`Self::parse`]
    pub fn parse_base64url(text: &str) -> Result<Self, WebAuthnError> {
        Self::parse(&encoding::decode_base64url(text, "authenticator data")?)
    }

    #[must_use]
    pub fn public_key(&self) -> Option<&CredentialPublicKey> {
        self.attested_credential_data
            .as_ref()
            .and_then(|data| data.public_key.as_ref())
    }
}

impl AttestedCredentialData {
    /// Parse attested credential data starting right after the counter
    ///
    /// The cursor is left after the COSE key; any remaining bytes belong to
    /// the extensions.
    ///
    /// # Errors
    /// - `TruncatedBuffer` for the AAGUID, length prefix or credential ID
    /// - `InvalidCoseStructure` or `MissingKeyField` from the public key
    pub fn parse(cursor: &mut ByteCursor<'_>) -> Result<Self, WebAuthnError> {
        let aaguid = Aaguid(cursor.take_array::<AAGUID_LEN>(AuthDataField::Aaguid)?);
        let id_len = cursor.take_u16_be(AuthDataField::CredentialIdLength)?;
        let credential_id = cursor
            .take_bytes(usize::from(id_len), AuthDataField::CredentialId)?
            .to_vec();

        let (value, consumed) = cose::decode_cbor_prefix(cursor.remaining())?;
        let credential_public_key = cursor
            .take_bytes(consumed, AuthDataField::CredentialPublicKey)?
            .to_vec();
        debug!(
            "Attested credential data: aaguid {aaguid}, credential ID {id_len} bytes, \
             public key {consumed} bytes"
        );

        let public_key = match CoseKeyMap::from_value(value) {
            Some(map) => Some(cose::normalize_public_key(&map)?),
            None => {
                warn!("Credential public key is not a CBOR map, omitting parsed key");
                None
            }
        };

        Ok(Self {
            aaguid,
            credential_id,
            credential_public_key,
            public_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::builders::{cose_ec2_key, AuthDataBuilder};

    #[test]
    fn test_minimal_auth_data() {
        let mut bytes = vec![0x11; 32];
        bytes.push(0x05); // UP | UV
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x2A]);

        let parsed = AuthenticatorData::parse(&bytes).unwrap();
        assert_eq!(parsed.rp_id_hash, [0x11; 32]);
        assert!(parsed.flags.user_present);
        assert!(parsed.flags.user_verified);
        assert_eq!(parsed.counter, 42);
        assert!(parsed.attested_credential_data.is_none());
        assert!(parsed.extensions.is_none());
    }

    #[test]
    fn test_counter_max() {
        let bytes = AuthDataBuilder::new().counter(u32::MAX).build();
        assert_eq!(AuthenticatorData::parse(&bytes).unwrap().counter, 4_294_967_295);
    }

    #[test]
    fn test_short_buffers_name_the_field() {
        let bytes = AuthDataBuilder::new().build();

        let err = AuthenticatorData::parse(&bytes[..20]).unwrap_err();
        assert!(matches!(
            err,
            WebAuthnError::TruncatedBuffer {
                field: AuthDataField::RpIdHash,
                ..
            }
        ));

        let err = AuthenticatorData::parse(&bytes[..32]).unwrap_err();
        assert!(matches!(
            err,
            WebAuthnError::TruncatedBuffer {
                field: AuthDataField::Flags,
                ..
            }
        ));

        let err = AuthenticatorData::parse(&bytes[..36]).unwrap_err();
        assert_eq!(
            err,
            WebAuthnError::TruncatedBuffer {
                field: AuthDataField::Counter,
                needed: 4,
                available: 3,
            }
        );
    }

    #[test]
    fn test_attested_ec2_credential() {
        let bytes = AuthDataBuilder::new()
            .flags(0x41)
            .attested([0u8; 16], &[1, 2, 3, 4], &cose_ec2_key(&[0xAA; 32], &[0xBB; 32]))
            .build();

        let parsed = AuthenticatorData::parse(&bytes).unwrap();
        let attested = parsed.attested_credential_data.as_ref().unwrap();
        assert!(attested.aaguid.is_zero());
        assert_eq!(attested.credential_id, vec![1, 2, 3, 4]);

        let Some(CredentialPublicKey::Elliptic(key)) = parsed.public_key() else {
            panic!("expected elliptic key");
        };
        assert_eq!(key.algorithm, Some(cose::ResolvedLabel::Name("ES256")));
        assert_eq!(key.curve, cose::CoseCurve::Id(1));
        assert_eq!(key.x, vec![0xAA; 32]);
        assert_eq!(key.y, Some(cose::EcY::Coordinate(vec![0xBB; 32])));
        assert!(parsed.extensions.is_none());
    }

    #[test]
    fn test_credential_id_truncated() {
        let mut bytes = AuthDataBuilder::new().flags(0x41).build();
        bytes.extend_from_slice(&[0u8; 16]);
        bytes.extend_from_slice(&[0x00, 0x10]); // 16-byte ID announced
        bytes.extend_from_slice(&[0xAB; 5]);

        assert_eq!(
            AuthenticatorData::parse(&bytes).unwrap_err(),
            WebAuthnError::TruncatedBuffer {
                field: AuthDataField::CredentialId,
                needed: 16,
                available: 5,
            }
        );
    }

    #[test]
    fn test_missing_public_key_is_invalid_cose() {
        let bytes = AuthDataBuilder::new()
            .flags(0x41)
            .attested([0u8; 16], &[9], &[])
            .build();
        assert!(matches!(
            AuthenticatorData::parse(&bytes),
            Err(WebAuthnError::InvalidCoseStructure(_))
        ));
    }

    #[test]
    fn test_non_map_public_key_is_omitted() {
        // CBOR unsigned integer 5
        let bytes = AuthDataBuilder::new()
            .flags(0x41)
            .attested([0u8; 16], &[9], &[0x05])
            .build();
        let parsed = AuthenticatorData::parse(&bytes).unwrap();
        let attested = parsed.attested_credential_data.unwrap();
        assert_eq!(attested.credential_public_key, vec![0x05]);
        assert!(attested.public_key.is_none());
    }

    #[test]
    fn test_extensions_kept_raw() {
        // {"credProtect": 2}
        let extensions = [
            0xA1, 0x6B, b'c', b'r', b'e', b'd', b'P', b'r', b'o', b't', b'e', b'c', b't', 0x02,
        ];
        let key = cose_ec2_key(&[1; 32], &[2; 32]);
        let bytes = AuthDataBuilder::new()
            .flags(0xC5)
            .attested([7u8; 16], &[1], &key)
            .extensions(&extensions)
            .build();

        let parsed = AuthenticatorData::parse(&bytes).unwrap();
        assert!(parsed.flags.extension_data);
        assert_eq!(parsed.extensions.as_deref(), Some(&extensions[..]));
        assert_eq!(
            parsed.attested_credential_data.unwrap().credential_public_key,
            key
        );
    }

    #[test]
    fn test_aaguid_formatting() {
        let aaguid = Aaguid([
            0xAD, 0xCE, 0x00, 0x02, 0x35, 0xBC, 0xC6, 0x0A, 0x64, 0x8B, 0x0B, 0x25, 0xF1, 0xF0,
            0x55, 0x03,
        ]);
        assert_eq!(aaguid.to_string(), "adce0002-35bc-c60a-648b-0b25f1f05503");
        assert_eq!(
            serde_json::to_value(aaguid).unwrap(),
            serde_json::json!("adce0002-35bc-c60a-648b-0b25f1f05503")
        );
    }

    #[test]
    fn test_parse_is_deterministic() {
        let bytes = AuthDataBuilder::new()
            .flags(0x45)
            .counter(7)
            .attested([3u8; 16], &[5; 32], &cose_ec2_key(&[4; 32], &[6; 32]))
            .build();
        assert_eq!(
            AuthenticatorData::parse(&bytes).unwrap(),
            AuthenticatorData::parse(&bytes).unwrap()
        );
    }
}
