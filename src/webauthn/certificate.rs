//! Readable rendering of attestation certificates
//!
//! Certificates from an `x5c` array are parsed with OpenSSL and summarized for
//! display. No path building or trust evaluation happens here.

use openssl::pkey::Id;
use openssl::x509::{X509NameRef, X509};
use serde::Serialize;

use super::errors::WebAuthnError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSummary {
    /// X.509 version as written on the certificate (1, 2 or 3)
    pub version: i32,
    /// Upper-case hexadecimal serial number
    pub serial_number: String,
    pub subject: String,
    pub issuer: String,
    pub not_before: String,
    pub not_after: String,
    pub signature_algorithm: String,
    pub public_key_type: String,
    pub public_key_bits: u32,
}

/// Summarize a single DER certificate
///
/// # Errors
/// Returns `InvalidCertificate` if the DER cannot be parsed
pub fn summarize(der: &[u8], index: usize) -> Result<CertificateSummary, WebAuthnError> {
    let fail = |e: openssl::error::ErrorStack| WebAuthnError::InvalidCertificate {
        index,
        message: e.to_string(),
    };

    let cert = X509::from_der(der).map_err(fail)?;
    let serial_number = cert
        .serial_number()
        .to_bn()
        .and_then(|bn| bn.to_hex_str())
        .map_err(fail)?
        .to_string();
    let public_key = cert.public_key().map_err(fail)?;

    Ok(CertificateSummary {
        version: cert.version() + 1,
        serial_number,
        subject: format_name(cert.subject_name()),
        issuer: format_name(cert.issuer_name()),
        not_before: cert.not_before().to_string(),
        not_after: cert.not_after().to_string(),
        signature_algorithm: cert.signature_algorithm().object().to_string(),
        public_key_type: key_type_name(public_key.id()).to_string(),
        public_key_bits: public_key.bits(),
    })
}

/// Summarize every certificate of an `x5c` chain, leaf first
///
/// # Errors
/// Returns `InvalidCertificate` naming the first entry that fails to parse
pub fn summarize_chain(x5c: &[Vec<u8>]) -> Result<Vec<CertificateSummary>, WebAuthnError> {
    x5c.iter()
        .enumerate()
        .map(|(index, der)| summarize(der, index))
        .collect()
}

/// One-line distinguished name, e.g. `CN=Yubico U2F EE Serial 1, O=Yubico AB`
fn format_name(name: &X509NameRef) -> String {
    name.entries()
        .map(|entry| {
            let field = entry.object().nid().short_name().map_or_else(
                |_| entry.object().to_string(),
                ToString::to_string,
            );
            let value = String::from_utf8_lossy(entry.data().as_slice());
            format!("{field}={value}")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn key_type_name(id: Id) -> &'static str {
    const NAMES: [(Id, &str); 5] = [
        (Id::RSA, "RSA"),
        (Id::EC, "EC"),
        (Id::ED25519, "Ed25519"),
        (Id::ED448, "Ed448"),
        (Id::DSA, "DSA"),
    ];
    NAMES
        .iter()
        .find(|(known, _)| *known == id)
        .map_or("unknown", |&(_, name)| name)
}
