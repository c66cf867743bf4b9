//! Testing utilities for the inspector
//!
//! - [`builders`] - Encoders for authenticator data, COSE keys and attestation objects
//! - [`fixtures`] - Complete client responses ready to post to the HTTP surface
//!
//! ## Usage
//!
//! ```rust,ignore
//! use authdata_inspector::testing::builders::{cose_ec2_key, AuthDataBuilder};
//! use authdata_inspector::webauthn::AuthenticatorData;
//!
//! let bytes = AuthDataBuilder::new()
//!     .flags(0x41)
//!     .attested([0; 16], &[1, 2, 3, 4], &cose_ec2_key(&[1; 32], &[2; 32]))
//!     .build();
//! let parsed = AuthenticatorData::parse(&bytes).unwrap();
//! assert!(parsed.public_key().is_some());
//! ```

pub mod builders;
pub mod fixtures;

pub use fixtures::TestFixtures;

/// Common test constants
pub mod constants {
    /// Default relying party origin
    pub const TEST_ORIGIN: &str = "https://example.com";

    /// Default relying party ID
    pub const TEST_RP_ID: &str = "example.com";

    /// Base64URL challenge embedded in generated client data
    pub const TEST_CHALLENGE: &str = "dGVzdC1jaGFsbGVuZ2UtMTIzNDU2Nzg5MA";

    /// Credential ID used by fixtures
    pub const TEST_CREDENTIAL_ID: &[u8] = &[0xC0, 0xFF, 0xEE, 0x01, 0x02, 0x03, 0x04, 0x05];
}
