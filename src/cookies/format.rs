//! Serialization formats for the cookie payload.
//!
//! A format turns a [`CookieMapping`] into a cookie-value string and back.
//! Decoding distinguishes an empty mapping from a malformed payload by the
//! shape of the decoded document:
//!
//! | Decoded shape | Result |
//! |---------------|--------|
//! | object | the mapping |
//! | `null`, `false`, `[]`, empty input | empty mapping |
//! | anything else | [`CookieError::Transcode`] |

use crate::base::cookieerror::{CookieError, WriteError};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The logical key/value content of one cookie.
pub type CookieMapping = serde_json::Map<String, Value>;

/// Wire encoding of the mapping inside the cookie value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// Plain compact JSON. Percent-encoded by the header layer.
    #[default]
    Json,
    /// Base64url (unpadded) of compact JSON. Needs no further escaping.
    #[serde(alias = "base64")]
    Base64Json,
}

impl Format {
    /// Short tag passed to crypto providers as the format hint.
    pub fn tag(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Base64Json => "base64_json",
        }
    }

    /// Parse a format tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "base64_json" | "base64" => Some(Format::Base64Json),
            _ => None,
        }
    }

    /// Encode a mapping into a cookie value string.
    pub fn encode(&self, mapping: &CookieMapping) -> Result<String, WriteError> {
        let json = serde_json::to_string(mapping)?;
        Ok(match self {
            Format::Json => json,
            Format::Base64Json => URL_SAFE_NO_PAD.encode(json.as_bytes()),
        })
    }

    /// Decode a cookie value string into a mapping.
    pub fn decode(&self, raw: &str) -> Result<CookieMapping, CookieError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(CookieMapping::new());
        }

        match self {
            Format::Json => decode_json(raw.as_bytes()),
            Format::Base64Json => {
                let bytes = URL_SAFE_NO_PAD
                    .decode(raw)
                    .map_err(|e| CookieError::transcode(format!("invalid base64: {}", e)))?;
                decode_json(&bytes)
            }
        }
    }

    /// Encode a mapping to plaintext bytes, for crypto providers.
    pub fn encode_bytes(&self, mapping: &CookieMapping) -> Result<Vec<u8>, WriteError> {
        self.encode(mapping).map(String::into_bytes)
    }

    /// Decode plaintext bytes produced by [`Format::encode_bytes`].
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<CookieMapping, CookieError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| CookieError::transcode("payload is not valid UTF-8"))?;
        self.decode(text)
    }
}

fn decode_json(bytes: &[u8]) -> Result<CookieMapping, CookieError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| CookieError::transcode(format!("invalid JSON: {}", e)))?;
    into_mapping(value)
}

/// Classify a decoded document by shape.
pub fn into_mapping(value: Value) -> Result<CookieMapping, CookieError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null | Value::Bool(false) => Ok(CookieMapping::new()),
        Value::Array(items) if items.is_empty() => Ok(CookieMapping::new()),
        other => Err(CookieError::transcode(format!(
            "expected a mapping, found {}",
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> CookieMapping {
        let Value::Object(map) = json!({"user": "ann", "n": 3, "tags": ["a", "b"], "nested": {"ok": true}}) else {
            unreachable!()
        };
        map
    }

    #[test]
    fn test_json_roundtrip() {
        let encoded = Format::Json.encode(&sample()).unwrap();
        assert_eq!(Format::Json.decode(&encoded).unwrap(), sample());
    }

    #[test]
    fn test_base64_is_cookie_safe() {
        let encoded = Format::Base64Json.encode(&sample()).unwrap();
        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(Format::Base64Json.decode(&encoded).unwrap(), sample());
    }

    #[test]
    fn test_canonical_empty_values() {
        for raw in ["", "   ", "{}", "null", "false", "[]"] {
            assert!(Format::Json.decode(raw).unwrap().is_empty(), "raw = {raw:?}");
        }
        assert!(Format::Base64Json.decode("").unwrap().is_empty());
    }

    #[test]
    fn test_non_mapping_shapes_are_errors() {
        for raw in ["true", "42", "\"text\"", "[1,2]"] {
            let err = Format::Json.decode(raw).unwrap_err();
            assert!(matches!(err, CookieError::Transcode(_)), "raw = {raw:?}");
        }
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(
            Format::Json.decode("{\"a\":"),
            Err(CookieError::Transcode(_))
        ));
        assert!(matches!(
            Format::Base64Json.decode("%%%"),
            Err(CookieError::Transcode(_))
        ));
        // Legacy serialized false is not JSON.
        assert!(matches!(
            Format::Json.decode("b:0;"),
            Err(CookieError::Transcode(_))
        ));
    }

    #[test]
    fn test_tags() {
        assert_eq!(Format::from_tag("JSON"), Some(Format::Json));
        assert_eq!(Format::from_tag("base64"), Some(Format::Base64Json));
        assert_eq!(Format::from_tag(Format::Base64Json.tag()), Some(Format::Base64Json));
        assert_eq!(Format::from_tag("php"), None);
    }

    #[test]
    fn test_decode_bytes_rejects_invalid_utf8() {
        assert!(matches!(
            Format::Json.decode_bytes(&[0xff, 0xfe]),
            Err(CookieError::Transcode(_))
        ));
    }
}
