//! COSE public key processing
//!
//! The credential public key embedded in attested credential data is a CBOR map
//! keyed by small integers. Labels `-1`, `-2` and `-3` mean different things
//! depending on the key type, so each key family gets its own record.

use ciborium::value::Value;
use log::debug;
use serde::{Serialize, Serializer};

use super::encoding;
use super::errors::WebAuthnError;

/// Common COSE key labels
pub mod labels {
    pub const KTY: i64 = 1;
    pub const ALG: i64 = 3;
    // EC2 / OKP
    pub const CRV: i64 = -1;
    pub const X: i64 = -2;
    pub const Y: i64 = -3;
    // RSA
    pub const MODULUS: i64 = -1;
    pub const EXPONENT: i64 = -2;
    // AKP (ML-DSA)
    pub const PUB: i64 = -1;
}

/// Key type codes with dedicated handling
pub mod key_types {
    pub const OKP: i64 = 1;
    pub const EC2: i64 = 2;
    pub const RSA: i64 = 3;
    pub const AKP: i64 = 7;
}

/// Name of a COSE key type, if registered
#[must_use]
pub fn key_type_name(code: i64) -> Option<&'static str> {
    let name = match code {
        1 => "OKP",
        2 => "EC2",
        3 => "RSA",
        4 => "Symmetric",
        5 => "HSS-LMS",
        6 => "WalnutDSA",
        7 => "AKP",
        _ => return None,
    };
    Some(name)
}

/// Name of a COSE algorithm, if registered
#[must_use]
pub fn algorithm_name(code: i64) -> Option<&'static str> {
    let name = match code {
        -7 => "ES256",
        -8 => "EdDSA",
        -9 => "ESP256",
        -19 => "Ed25519",
        -35 => "ES384",
        -36 => "ES512",
        -37 => "PS256",
        -38 => "PS384",
        -39 => "PS512",
        -47 => "ES256K",
        -48 => "ML-DSA-44",
        -49 => "ML-DSA-65",
        -50 => "ML-DSA-87",
        -51 => "ESP384",
        -52 => "ESP512",
        -53 => "Ed448",
        -257 => "RS256",
        -258 => "RS384",
        -259 => "RS512",
        -65535 => "RS1",
        _ => return None,
    };
    Some(name)
}

/// A registry code rendered by name when known, otherwise kept raw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResolvedLabel {
    Name(&'static str),
    Code(i64),
}

impl ResolvedLabel {
    fn resolve(code: i64, lookup: fn(i64) -> Option<&'static str>) -> Self {
        lookup(code).map_or(Self::Code(code), Self::Name)
    }
}

#[must_use]
pub fn resolve_key_type(code: i64) -> ResolvedLabel {
    ResolvedLabel::resolve(code, key_type_name)
}

#[must_use]
pub fn resolve_algorithm(code: i64) -> ResolvedLabel {
    ResolvedLabel::resolve(code, algorithm_name)
}

/// Decoded COSE key map, in encoded order
#[derive(Debug, Clone, PartialEq)]
pub struct CoseKeyMap(Vec<(Value, Value)>);

impl CoseKeyMap {
    /// Wrap a decoded CBOR value; anything other than a map yields `None`
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        value.into_map().ok().map(Self)
    }

    /// Value stored under an integer label
    #[must_use]
    pub fn get(&self, label: i64) -> Option<&Value> {
        self.0
            .iter()
            .find(|(k, _)| matches!(k, Value::Integer(i) if i128::from(*i) == i128::from(label)))
            .map(|(_, v)| v)
    }

    fn integer(&self, label: i64, variant: &'static str) -> Result<Option<i64>, WebAuthnError> {
        self.get(label)
            .map(|value| {
                value
                    .as_integer()
                    .and_then(|i| i64::try_from(i).ok())
                    .ok_or_else(|| {
                        WebAuthnError::InvalidCoseStructure(format!(
                            "label {label} of {variant} key must be an integer"
                        ))
                    })
            })
            .transpose()
    }

    fn bytes(&self, label: i64, variant: &'static str) -> Result<Option<Vec<u8>>, WebAuthnError> {
        self.get(label)
            .map(|value| {
                value.as_bytes().cloned().ok_or_else(|| {
                    WebAuthnError::InvalidCoseStructure(format!(
                        "label {label} of {variant} key must be a byte string"
                    ))
                })
            })
            .transpose()
    }

    fn required_bytes(&self, label: i64, variant: &'static str) -> Result<Vec<u8>, WebAuthnError> {
        self.bytes(label, variant)?
            .ok_or(WebAuthnError::MissingKeyField { variant, label })
    }
}

/// Decode one CBOR item from the front of `bytes`
///
/// Returns the item together with the number of bytes it occupied; anything
/// after that is left for the caller.
///
/// # Errors
/// Returns `InvalidCoseStructure` if the bytes are not well-formed CBOR
pub fn decode_cbor_prefix(bytes: &[u8]) -> Result<(Value, usize), WebAuthnError> {
    let mut reader = bytes;
    let value: Value = ciborium::de::from_reader(&mut reader)
        .map_err(|e| WebAuthnError::InvalidCoseStructure(e.to_string()))?;
    Ok((value, bytes.len() - reader.len()))
}

/// Curve identifier, kept in its encoded form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CoseCurve {
    Id(i64),
    Name(String),
}

/// EC2 `y` member: a full coordinate, or the sign bit of a compressed point
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcY {
    Coordinate(Vec<u8>),
    SignBit(bool),
}

impl Serialize for EcY {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EcY::Coordinate(bytes) => encoding::serialize(bytes, serializer),
            EcY::SignBit(bit) => serializer.serialize_bool(*bit),
        }
    }
}

/// EC2 and OKP keys (and other registered key types without dedicated handling)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EllipticKey {
    pub key_type: ResolvedLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<ResolvedLabel>,
    pub curve: CoseCurve,
    #[serde(serialize_with = "encoding::serialize")]
    pub x: Vec<u8>,
    /// Absent for OKP keys
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<EcY>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsaKey {
    pub key_type: ResolvedLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<ResolvedLabel>,
    #[serde(serialize_with = "encoding::serialize")]
    pub modulus: Vec<u8>,
    pub exponent: u64,
}

/// AKP keys (ML-DSA)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatticeKey {
    pub key_type: ResolvedLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<ResolvedLabel>,
    #[serde(rename = "pub", serialize_with = "encoding::serialize")]
    pub public_key: Vec<u8>,
}

/// Normalized credential public key, one record per key family
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "keyVariant", rename_all = "camelCase")]
pub enum CredentialPublicKey {
    Elliptic(EllipticKey),
    Rsa(RsaKey),
    Lattice(LatticeKey),
    Unknown {
        #[serde(rename = "keyType")]
        key_type: i64,
    },
}

impl CredentialPublicKey {
    #[must_use]
    pub fn variant_name(&self) -> &'static str {
        match self {
            CredentialPublicKey::Elliptic(_) => "elliptic",
            CredentialPublicKey::Rsa(_) => "rsa",
            CredentialPublicKey::Lattice(_) => "lattice",
            CredentialPublicKey::Unknown { .. } => "unknown",
        }
    }

    /// Resolved algorithm, when the key declares one
    #[must_use]
    pub fn algorithm(&self) -> Option<ResolvedLabel> {
        match self {
            CredentialPublicKey::Elliptic(key) => key.algorithm,
            CredentialPublicKey::Rsa(key) => key.algorithm,
            CredentialPublicKey::Lattice(key) => key.algorithm,
            CredentialPublicKey::Unknown { .. } => None,
        }
    }
}

/// Build the key record matching the map's key type
///
/// # Errors
/// - `MissingKeyField` if the key type or a label the key family requires is absent
/// - `InvalidCoseStructure` if a label holds a value of the wrong CBOR type
pub fn normalize_public_key(map: &CoseKeyMap) -> Result<CredentialPublicKey, WebAuthnError> {
    let kty = map
        .integer(labels::KTY, "COSE")?
        .ok_or(WebAuthnError::MissingKeyField {
            variant: "COSE",
            label: labels::KTY,
        })?;

    let Some(variant) = key_type_name(kty) else {
        debug!("Unrecognized COSE key type {kty}, keeping raw code");
        return Ok(CredentialPublicKey::Unknown { key_type: kty });
    };

    let key_type = resolve_key_type(kty);
    let algorithm = map.integer(labels::ALG, variant)?.map(resolve_algorithm);

    let key = match kty {
        key_types::RSA => CredentialPublicKey::Rsa(RsaKey {
            key_type,
            algorithm,
            modulus: map.required_bytes(labels::MODULUS, variant)?,
            exponent: exponent_from_bytes(&map.required_bytes(labels::EXPONENT, variant)?)?,
        }),
        key_types::AKP => CredentialPublicKey::Lattice(LatticeKey {
            key_type,
            algorithm,
            public_key: map.required_bytes(labels::PUB, variant)?,
        }),
        _ => CredentialPublicKey::Elliptic(EllipticKey {
            key_type,
            algorithm,
            curve: curve(map, variant)?,
            x: map.required_bytes(labels::X, variant)?,
            y: y_member(map, variant)?,
        }),
    };

    debug!(
        "Normalized {variant} credential public key as {} variant",
        key.variant_name()
    );
    Ok(key)
}

fn y_member(map: &CoseKeyMap, variant: &'static str) -> Result<Option<EcY>, WebAuthnError> {
    match map.get(labels::Y) {
        None => Ok(None),
        Some(Value::Bytes(y)) => Ok(Some(EcY::Coordinate(y.clone()))),
        Some(Value::Bool(sign)) => {
            debug!("{variant} key carries a compressed point");
            Ok(Some(EcY::SignBit(*sign)))
        }
        Some(_) => Err(WebAuthnError::InvalidCoseStructure(format!(
            "label {} of {variant} key must be a byte string or a bool",
            labels::Y
        ))),
    }
}

fn curve(map: &CoseKeyMap, variant: &'static str) -> Result<CoseCurve, WebAuthnError> {
    match map.get(labels::CRV) {
        None => Err(WebAuthnError::MissingKeyField {
            variant,
            label: labels::CRV,
        }),
        Some(Value::Text(name)) => Ok(CoseCurve::Name(name.clone())),
        Some(Value::Integer(id)) => i64::try_from(*id).map(CoseCurve::Id).map_err(|_| {
            WebAuthnError::InvalidCoseStructure(format!("curve of {variant} key is out of range"))
        }),
        Some(_) => Err(WebAuthnError::InvalidCoseStructure(format!(
            "curve of {variant} key must be an integer or text"
        ))),
    }
}

/// Interpret an RSA exponent byte string as a big-endian unsigned integer
fn exponent_from_bytes(bytes: &[u8]) -> Result<u64, WebAuthnError> {
    let significant = match bytes.iter().position(|&b| b != 0) {
        Some(start) => &bytes[start..],
        None => return Ok(0),
    };
    if significant.len() > 8 {
        return Err(WebAuthnError::InvalidCoseStructure(
            "RSA exponent does not fit in 64 bits".to_string(),
        ));
    }
    Ok(significant
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: Vec<(i64, Value)>) -> CoseKeyMap {
        CoseKeyMap(
            entries
                .into_iter()
                .map(|(k, v)| (Value::Integer(k.into()), v))
                .collect(),
        )
    }

    fn int(i: i64) -> Value {
        Value::Integer(i.into())
    }

    #[test]
    fn test_resolvers_fall_back_to_raw_code() {
        assert_eq!(resolve_algorithm(-7), ResolvedLabel::Name("ES256"));
        assert_eq!(resolve_algorithm(-257), ResolvedLabel::Name("RS256"));
        assert_eq!(resolve_algorithm(-49), ResolvedLabel::Name("ML-DSA-65"));
        assert_eq!(resolve_algorithm(12345), ResolvedLabel::Code(12345));
        assert_eq!(resolve_key_type(2), ResolvedLabel::Name("EC2"));
        assert_eq!(resolve_key_type(99), ResolvedLabel::Code(99));
    }

    #[test]
    fn test_resolved_label_serializes_untagged() {
        assert_eq!(
            serde_json::to_value(ResolvedLabel::Name("ES256")).unwrap(),
            serde_json::json!("ES256")
        );
        assert_eq!(
            serde_json::to_value(ResolvedLabel::Code(-999)).unwrap(),
            serde_json::json!(-999)
        );
    }

    #[test]
    fn test_ec2_key() {
        let key = map(vec![
            (1, int(2)),
            (3, int(-7)),
            (-1, int(1)),
            (-2, Value::Bytes(vec![0xAA; 32])),
            (-3, Value::Bytes(vec![0xBB; 32])),
        ]);

        let CredentialPublicKey::Elliptic(ec) = normalize_public_key(&key).unwrap() else {
            panic!("expected elliptic key");
        };
        assert_eq!(ec.key_type, ResolvedLabel::Name("EC2"));
        assert_eq!(ec.algorithm, Some(ResolvedLabel::Name("ES256")));
        assert_eq!(ec.curve, CoseCurve::Id(1));
        assert_eq!(ec.x, vec![0xAA; 32]);
        assert_eq!(ec.y, Some(EcY::Coordinate(vec![0xBB; 32])));
    }

    #[test]
    fn test_okp_key_without_y() {
        let key = map(vec![
            (1, int(1)),
            (3, int(-8)),
            (-1, int(6)),
            (-2, Value::Bytes(vec![0x11; 32])),
        ]);

        let CredentialPublicKey::Elliptic(okp) = normalize_public_key(&key).unwrap() else {
            panic!("expected elliptic key");
        };
        assert_eq!(okp.key_type, ResolvedLabel::Name("OKP"));
        assert_eq!(okp.algorithm, Some(ResolvedLabel::Name("EdDSA")));
        assert_eq!(okp.y, None);

        let json = serde_json::to_value(CredentialPublicKey::Elliptic(okp)).unwrap();
        assert_eq!(json["keyVariant"], "elliptic");
        assert!(json.get("y").is_none());
    }

    #[test]
    fn test_ec2_compressed_point_sign_bit() {
        let key = map(vec![
            (1, int(2)),
            (3, int(-7)),
            (-1, int(1)),
            (-2, Value::Bytes(vec![0x11; 32])),
            (-3, Value::Bool(true)),
        ]);

        let parsed = normalize_public_key(&key).unwrap();
        assert_eq!(parsed.variant_name(), "elliptic");
        let CredentialPublicKey::Elliptic(ec) = &parsed else {
            panic!("expected elliptic key");
        };
        assert_eq!(ec.x, vec![0x11; 32]);
        assert_eq!(ec.y, Some(EcY::SignBit(true)));

        let json = serde_json::to_value(&parsed).unwrap();
        assert_eq!(json["y"], true);
    }

    #[test]
    fn test_ec2_y_coordinate_serializes_base64url() {
        let key = map(vec![
            (1, int(2)),
            (-1, int(1)),
            (-2, Value::Bytes(vec![0x11; 32])),
            (-3, Value::Bytes(vec![0xFB, 0xFF])),
        ]);
        let json = serde_json::to_value(normalize_public_key(&key).unwrap()).unwrap();
        assert_eq!(json["y"], "-_8");
    }

    #[test]
    fn test_ec2_y_of_other_type_rejected() {
        let key = map(vec![
            (1, int(2)),
            (-1, int(1)),
            (-2, Value::Bytes(vec![0x11; 32])),
            (-3, int(4)),
        ]);
        assert!(matches!(
            normalize_public_key(&key),
            Err(WebAuthnError::InvalidCoseStructure(msg)) if msg.contains("-3")
        ));
    }

    #[test]
    fn test_text_curve_kept_verbatim() {
        let key = map(vec![
            (1, int(2)),
            (-1, Value::Text("P-256".to_string())),
            (-2, Value::Bytes(vec![1; 32])),
        ]);
        let CredentialPublicKey::Elliptic(ec) = normalize_public_key(&key).unwrap() else {
            panic!("expected elliptic key");
        };
        assert_eq!(ec.curve, CoseCurve::Name("P-256".to_string()));
        assert_eq!(ec.algorithm, None);
    }

    #[test]
    fn test_rsa_key() {
        let key = map(vec![
            (1, int(3)),
            (3, int(-257)),
            (-1, Value::Bytes(vec![0xC5; 256])),
            (-2, Value::Bytes(vec![0x01, 0x00, 0x01])),
        ]);

        let CredentialPublicKey::Rsa(rsa) = normalize_public_key(&key).unwrap() else {
            panic!("expected RSA key");
        };
        assert_eq!(rsa.algorithm, Some(ResolvedLabel::Name("RS256")));
        assert_eq!(rsa.modulus.len(), 256);
        assert_eq!(rsa.exponent, 65537);
    }

    #[test]
    fn test_rsa_missing_exponent() {
        let key = map(vec![(1, int(3)), (-1, Value::Bytes(vec![0xC5; 256]))]);
        assert_eq!(
            normalize_public_key(&key).unwrap_err(),
            WebAuthnError::MissingKeyField {
                variant: "RSA",
                label: -2,
            }
        );
    }

    #[test]
    fn test_lattice_key() {
        let key = map(vec![
            (1, int(7)),
            (3, int(-48)),
            (-1, Value::Bytes(vec![0x42; 1312])),
        ]);

        let CredentialPublicKey::Lattice(akp) = normalize_public_key(&key).unwrap() else {
            panic!("expected lattice key");
        };
        assert_eq!(akp.algorithm, Some(ResolvedLabel::Name("ML-DSA-44")));
        assert_eq!(akp.public_key.len(), 1312);
    }

    #[test]
    fn test_unknown_key_type_is_not_an_error() {
        let key = map(vec![(1, int(99)), (-1, int(1))]);
        assert_eq!(
            normalize_public_key(&key).unwrap(),
            CredentialPublicKey::Unknown { key_type: 99 }
        );
    }

    #[test]
    fn test_unknown_algorithm_kept_raw() {
        let key = map(vec![
            (1, int(2)),
            (3, int(-4242)),
            (-1, int(1)),
            (-2, Value::Bytes(vec![1; 32])),
        ]);
        let parsed = normalize_public_key(&key).unwrap();
        assert_eq!(parsed.algorithm(), Some(ResolvedLabel::Code(-4242)));
    }

    #[test]
    fn test_missing_key_type() {
        let key = map(vec![(3, int(-7))]);
        assert_eq!(
            normalize_public_key(&key).unwrap_err(),
            WebAuthnError::MissingKeyField {
                variant: "COSE",
                label: 1,
            }
        );
    }

    #[test]
    fn test_wrong_value_type() {
        let key = map(vec![(1, int(2)), (-1, int(1)), (-2, int(5))]);
        assert!(matches!(
            normalize_public_key(&key),
            Err(WebAuthnError::InvalidCoseStructure(_))
        ));
    }

    #[test]
    fn test_exponent_from_bytes() {
        assert_eq!(exponent_from_bytes(&[0x01, 0x00, 0x01]).unwrap(), 65537);
        assert_eq!(exponent_from_bytes(&[0x00, 0x00, 0x03]).unwrap(), 3);
        assert_eq!(exponent_from_bytes(&[]).unwrap(), 0);
        assert!(exponent_from_bytes(&[0x01; 9]).is_err());
    }

    #[test]
    fn test_decode_cbor_prefix_reports_consumed_length() {
        let mut encoded = Vec::new();
        ciborium::ser::into_writer(&Value::Map(vec![(int(1), int(2))]), &mut encoded).unwrap();
        let map_len = encoded.len();
        encoded.extend_from_slice(&[0xA0]); // trailing empty map

        let (value, consumed) = decode_cbor_prefix(&encoded).unwrap();
        assert_eq!(consumed, map_len);
        assert_eq!(CoseKeyMap::from_value(value).unwrap().get(1), Some(&int(2)));
    }

    #[test]
    fn test_decode_cbor_prefix_rejects_garbage() {
        assert!(matches!(
            decode_cbor_prefix(&[0xFF, 0xFF]),
            Err(WebAuthnError::InvalidCoseStructure(_))
        ));
        assert!(matches!(
            decode_cbor_prefix(&[]),
            Err(WebAuthnError::InvalidCoseStructure(_))
        ));
    }

    #[test]
    fn test_non_map_value_is_not_a_key() {
        assert!(CoseKeyMap::from_value(int(5)).is_none());
    }
}
