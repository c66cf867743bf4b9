//! Test fixtures providing complete client responses
//!
//! Each fixture is the JSON a browser would post after `credential.toJSON()`,
//! with every binary member generated by the builders.

use serde_json::{json, Value};

use super::builders::{attestation_object, client_data_json, cose_ec2_key, AuthDataBuilder};
use super::constants::TEST_CREDENTIAL_ID;
use crate::webauthn::encode_base64url;

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// Authenticator data of a new ES256 credential (flags UP, UV, AT)
    #[must_use]
    pub fn registration_auth_data() -> Vec<u8> {
        AuthDataBuilder::new()
            .flags(0x45)
            .attested(
                [0u8; 16],
                TEST_CREDENTIAL_ID,
                &cose_ec2_key(&[0x0A; 32], &[0x0B; 32]),
            )
            .build()
    }

    /// Authenticator data of an assertion (flags UP, UV; counter 8)
    #[must_use]
    pub fn assertion_auth_data() -> Vec<u8> {
        AuthDataBuilder::new().flags(0x05).counter(8).build()
    }

    /// Registration response with a `none` attestation
    #[must_use]
    pub fn registration_response_json() -> Value {
        let credential_id = encode_base64url(TEST_CREDENTIAL_ID);
        json!({
            "id": credential_id,
            "rawId": credential_id,
            "type": "public-key",
            "response": {
                "clientDataJSON": encode_base64url(client_data_json("webauthn.create")),
                "attestationObject": encode_base64url(attestation_object(
                    "none",
                    vec![],
                    &Self::registration_auth_data(),
                )),
                "transports": ["internal", "hybrid"],
            },
            "authenticatorAttachment": "platform",
            "clientExtensionResults": {},
        })
    }

    /// Authentication response with user handle `user-1234`
    #[must_use]
    pub fn authentication_response_json() -> Value {
        let credential_id = encode_base64url(TEST_CREDENTIAL_ID);
        json!({
            "id": credential_id,
            "rawId": credential_id,
            "type": "public-key",
            "response": {
                "clientDataJSON": encode_base64url(client_data_json("webauthn.get")),
                "authenticatorData": encode_base64url(Self::assertion_auth_data()),
                "signature": encode_base64url([0x30u8, 0x44, 0x02, 0x20]),
                "userHandle": encode_base64url(b"user-1234"),
            },
            "clientExtensionResults": {},
        })
    }
}
