//! JSON encoding of the tag map.
//!
//! On disk the map is a flat object from decimal id strings to tags, e.g.
//! `{"76561198000000000":"Alice#1234"}`. serde_json writes integer map keys as
//! strings and parses them back, so no custom key handling is needed.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// JSON serializer with optional pretty-printing.
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    pretty: bool,
}

impl JsonSerializer {
    /// Compact JSON (single line, no extra whitespace).
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretty-printed JSON with indentation.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Encode a map snapshot to bytes.
    pub fn serialize(&self, data: &HashMap<i64, String>) -> Result<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(data)
        } else {
            serde_json::to_vec(data)
        };
        bytes.map_err(|e| Error::Serialize(e.to_string()))
    }

    /// Decode file contents. Anything other than an object of integer-string
    /// keys to strings is a [`Error::Format`].
    pub fn deserialize(&self, bytes: &[u8]) -> Result<HashMap<i64, String>> {
        serde_json::from_slice(bytes).map_err(|e| Error::Format(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_decimal_strings() {
        let data = HashMap::from([(76561198000000000_i64, "Alice#1234".to_string())]);
        let bytes = JsonSerializer::new().serialize(&data).unwrap();
        assert_eq!(bytes, br#"{"76561198000000000":"Alice#1234"}"#);
    }

    #[test]
    fn negative_keys_parse() {
        let map = JsonSerializer::new()
            .deserialize(br#"{"-42":"x","0":""}"#)
            .unwrap();
        assert_eq!(map.get(&-42).map(String::as_str), Some("x"));
        assert_eq!(map.get(&0).map(String::as_str), Some(""));
    }

    #[test]
    fn wrong_shapes_are_format_errors() {
        let ser = JsonSerializer::new();
        let cases: [&[u8]; 7] = [
            b"",
            b"null",
            b"[]",
            b"{\"abc\":\"x\"}",
            b"{\"1\":2}",
            b"{\"99999999999999999999\":\"x\"}",
            b"{\"1\":\"x\"",
        ];
        for bad in cases {
            match ser.deserialize(bad) {
                Err(Error::Format(_)) => {}
                other => panic!("expected format error for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn pretty_output_is_indented() {
        let data = HashMap::from([(1_i64, "a".to_string())]);
        let raw = JsonSerializer::pretty().serialize(&data).unwrap();
        let raw = String::from_utf8(raw).unwrap();
        assert!(raw.contains('\n'));
        assert!(raw.contains("  "));
    }
}
