//! Fluent builders for creating encoded `WebAuthn` test inputs
//!
//! These produce the raw byte layouts an authenticator would emit, so decoders
//! can be exercised without recorded browser traffic.

use ciborium::value::Value;

use super::constants::{TEST_CHALLENGE, TEST_ORIGIN};

/// Builder for raw authenticator data bytes
#[derive(Debug, Clone)]
pub struct AuthDataBuilder {
    rp_id_hash: [u8; 32],
    flags: u8,
    counter: u32,
    attested: Option<Vec<u8>>,
    extensions: Vec<u8>,
}

impl Default for AuthDataBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthDataBuilder {
    /// User-present authenticator data with a zero counter and no credential
    #[must_use]
    pub fn new() -> Self {
        Self {
            rp_id_hash: [0x49; 32],
            flags: 0x01,
            counter: 0,
            attested: None,
            extensions: Vec::new(),
        }
    }

    #[must_use]
    pub fn rp_id_hash(mut self, hash: [u8; 32]) -> Self {
        self.rp_id_hash = hash;
        self
    }

    /// Set the raw flag byte; flags are not derived from the other fields
    #[must_use]
    pub fn flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn counter(mut self, counter: u32) -> Self {
        self.counter = counter;
        self
    }

    /// Append attested credential data with an already encoded COSE key
    ///
    /// # Panics
    /// Panics if the credential ID is longer than `u16::MAX`
    #[must_use]
    pub fn attested(mut self, aaguid: [u8; 16], credential_id: &[u8], cose_key: &[u8]) -> Self {
        let id_len = u16::try_from(credential_id.len()).expect("credential ID too long");
        let mut data = Vec::with_capacity(18 + credential_id.len() + cose_key.len());
        data.extend_from_slice(&aaguid);
        data.extend_from_slice(&id_len.to_be_bytes());
        data.extend_from_slice(credential_id);
        data.extend_from_slice(cose_key);
        self.attested = Some(data);
        self
    }

    #[must_use]
    pub fn extensions(mut self, extensions: &[u8]) -> Self {
        self.extensions = extensions.to_vec();
        self
    }

    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(37);
        out.extend_from_slice(&self.rp_id_hash);
        out.push(self.flags);
        out.extend_from_slice(&self.counter.to_be_bytes());
        if let Some(attested) = self.attested {
            out.extend_from_slice(&attested);
        }
        out.extend_from_slice(&self.extensions);
        out
    }
}

/// Encode any CBOR value
///
/// # Panics
/// Panics if serialization fails, which cannot happen for in-memory values
#[must_use]
pub fn cbor(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    ciborium::ser::into_writer(value, &mut out).expect("CBOR serialization failed");
    out
}

/// Encode a COSE key map from integer labels
#[must_use]
pub fn cose_key(entries: Vec<(i64, Value)>) -> Vec<u8> {
    cbor(&Value::Map(
        entries
            .into_iter()
            .map(|(label, value)| (Value::Integer(label.into()), value))
            .collect(),
    ))
}

/// ES256 key on P-256
#[must_use]
pub fn cose_ec2_key(x: &[u8], y: &[u8]) -> Vec<u8> {
    cose_key(vec![
        (1, Value::Integer(2.into())),
        (3, Value::Integer((-7).into())),
        (-1, Value::Integer(1.into())),
        (-2, Value::Bytes(x.to_vec())),
        (-3, Value::Bytes(y.to_vec())),
    ])
}

/// `EdDSA` key on Ed25519
#[must_use]
pub fn cose_okp_key(x: &[u8]) -> Vec<u8> {
    cose_key(vec![
        (1, Value::Integer(1.into())),
        (3, Value::Integer((-8).into())),
        (-1, Value::Integer(6.into())),
        (-2, Value::Bytes(x.to_vec())),
    ])
}

/// RS256 key
#[must_use]
pub fn cose_rsa_key(modulus: &[u8], exponent: &[u8]) -> Vec<u8> {
    cose_key(vec![
        (1, Value::Integer(3.into())),
        (3, Value::Integer((-257).into())),
        (-1, Value::Bytes(modulus.to_vec())),
        (-2, Value::Bytes(exponent.to_vec())),
    ])
}

/// ML-DSA-65 key
#[must_use]
pub fn cose_lattice_key(public_key: &[u8]) -> Vec<u8> {
    cose_key(vec![
        (1, Value::Integer(7.into())),
        (3, Value::Integer((-49).into())),
        (-1, Value::Bytes(public_key.to_vec())),
    ])
}

/// Encode an attestation object `{fmt, attStmt, authData}`
#[must_use]
pub fn attestation_object(fmt: &str, att_stmt: Vec<(&str, Value)>, auth_data: &[u8]) -> Vec<u8> {
    let statement = att_stmt
        .into_iter()
        .map(|(key, value)| (Value::Text(key.to_string()), value))
        .collect();
    cbor(&Value::Map(vec![
        (Value::Text("fmt".to_string()), Value::Text(fmt.to_string())),
        (Value::Text("attStmt".to_string()), Value::Map(statement)),
        (
            Value::Text("authData".to_string()),
            Value::Bytes(auth_data.to_vec()),
        ),
    ]))
}

/// Client data JSON bytes for the given ceremony type
#[must_use]
pub fn client_data_json(ceremony: &str) -> Vec<u8> {
    serde_json::json!({
        "type": ceremony,
        "challenge": TEST_CHALLENGE,
        "origin": TEST_ORIGIN,
        "crossOrigin": false,
    })
    .to_string()
    .into_bytes()
}

/// Self-signed P-256 certificate, DER encoded, with serial number `0x1234`
///
/// # Panics
/// Panics if OpenSSL fails to generate the key or certificate
#[cfg(feature = "x509")]
#[must_use]
pub fn self_signed_certificate_der(common_name: &str, organization: &str) -> Vec<u8> {
    use openssl::asn1::Asn1Time;
    use openssl::bn::BigNum;
    use openssl::ec::{EcGroup, EcKey};
    use openssl::hash::MessageDigest;
    use openssl::nid::Nid;
    use openssl::pkey::PKey;
    use openssl::x509::{X509Builder, X509NameBuilder};

    let build = || -> Result<Vec<u8>, openssl::error::ErrorStack> {
        let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1)?;
        let key = PKey::from_ec_key(EcKey::generate(&group)?)?;

        let mut name = X509NameBuilder::new()?;
        name.append_entry_by_text("CN", common_name)?;
        name.append_entry_by_text("O", organization)?;
        let name = name.build();

        let mut builder = X509Builder::new()?;
        builder.set_version(2)?;
        let serial = BigNum::from_u32(0x1234)?.to_asn1_integer()?;
        builder.set_serial_number(&serial)?;
        builder.set_subject_name(&name)?;
        builder.set_issuer_name(&name)?;
        builder.set_pubkey(&key)?;
        let not_before = Asn1Time::days_from_now(0)?;
        let not_after = Asn1Time::days_from_now(365)?;
        builder.set_not_before(&not_before)?;
        builder.set_not_after(&not_after)?;
        builder.sign(&key, MessageDigest::sha256())?;
        builder.build().to_der()
    };
    build().expect("failed to build test certificate")
}
