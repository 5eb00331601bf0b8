//! Opaque pagination cursor
//!
//! A cursor is the URL-safe base64 form of `{"s": <start offset>}`. Decoding
//! never fails: anything that does not decode cleanly means "start at 1".

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CursorToken {
    s: u64,
}

/// Encode a start offset
pub fn encode_cursor(start: u64) -> String {
    URL_SAFE.encode(serde_json::json!({ "s": start }).to_string())
}

/// Decode a cursor into the start offset it carries, or 1 when it carries none
pub fn decode_cursor(cursor: Option<&str>) -> u64 {
    cursor
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .and_then(|c| URL_SAFE.decode(c).or_else(|_| URL_SAFE_NO_PAD.decode(c)).ok())
        .and_then(|bytes| serde_json::from_slice::<CursorToken>(&bytes).ok())
        .map(|token| token.s)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for start in [0, 1, 11, 21, 1_000_001, u64::MAX] {
            assert_eq!(decode_cursor(Some(&encode_cursor(start))), start);
        }
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(encode_cursor(11), "eyJzIjoxMX0=");
        assert_eq!(decode_cursor(Some("eyJzIjoxMX0")), 11);
    }

    #[test]
    fn test_malformed_decodes_to_one() {
        assert_eq!(decode_cursor(None), 1);
        assert_eq!(decode_cursor(Some("")), 1);
        assert_eq!(decode_cursor(Some("%%%not base64")), 1);
        // valid base64, not JSON
        assert_eq!(decode_cursor(Some(&URL_SAFE.encode("hello"))), 1);
        // JSON with the wrong shape
        assert_eq!(decode_cursor(Some(&URL_SAFE.encode(r#"{"s":"x"}"#))), 1);
        assert_eq!(decode_cursor(Some(&URL_SAFE.encode(r#"{"s":-4}"#))), 1);
    }
}
