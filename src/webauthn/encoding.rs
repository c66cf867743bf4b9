//! Base64URL helpers
//!
//! Byte-valued fields are carried as raw bytes internally and rendered as
//! unpadded URL-safe base64 only when serialized.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Serializer;

use super::errors::WebAuthnError;

#[must_use]
pub fn encode_base64url(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode URL-safe base64, with or without trailing padding
///
/// # Errors
/// Returns `EncodingError` naming `what` if the text is not valid base64url
pub fn decode_base64url(text: &str, what: &str) -> Result<Vec<u8>, WebAuthnError> {
    URL_SAFE_NO_PAD
        .decode(text.trim().trim_end_matches('='))
        .map_err(|e| WebAuthnError::EncodingError(format!("Invalid {what} encoding: {e}")))
}

/// Serialize bytes as base64url text
///
/// # Errors
/// Propagates serializer errors
pub fn serialize<S, T>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]>,
{
    serializer.serialize_str(&encode_base64url(bytes))
}

/// Serialize optional bytes as base64url text
///
/// # Errors
/// Propagates serializer errors
pub fn serialize_option<S, T>(bytes: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]>,
{
    match bytes {
        Some(bytes) => serializer.serialize_some(&encode_base64url(bytes)),
        None => serializer.serialize_none(),
    }
}

/// Serialize a list of byte strings as a list of base64url strings
///
/// # Errors
/// Propagates serializer errors
pub fn serialize_list<S, T>(items: &[T], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]>,
{
    serializer.collect_seq(items.iter().map(encode_base64url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_is_unpadded_url_safe() {
        assert_eq!(encode_base64url([0xFBu8, 0xFF]), "-_8");
        assert_eq!(encode_base64url(b""), "");
    }

    #[test]
    fn test_decode_accepts_padding() {
        assert_eq!(decode_base64url("AQID", "test").unwrap(), vec![1, 2, 3]);
        assert_eq!(decode_base64url("AQI=", "test").unwrap(), vec![1, 2]);
        assert_eq!(decode_base64url("-_8", "test").unwrap(), vec![0xFB, 0xFF]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_base64url("not base64!", "signature").unwrap_err();
        assert!(matches!(err, WebAuthnError::EncodingError(msg) if msg.contains("signature")));
    }
}
