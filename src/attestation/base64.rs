// SPDX-License-Identifier: Apache-2.0

use base64::{self, engine::general_purpose, Engine as _};

use crate::errors::Error;

/// decodes bytes from a base64url-encoded JWT segment
pub fn decode_segment(v: &str) -> Result<Vec<u8>, Error> {
    general_purpose::URL_SAFE_NO_PAD
        .decode(v)
        .map_err(|e| Error::Format(e.to_string()))
}

/// decodes bytes from a standard base64-encoded payload, with or without
/// padding (policy documents come both ways)
pub fn decode_standard(v: &str) -> Result<Vec<u8>, Error> {
    general_purpose::STANDARD
        .decode(v)
        .or_else(|_| general_purpose::STANDARD_NO_PAD.decode(v))
        .map_err(|e| Error::Format(e.to_string()))
}

/// decodes a base64url segment and parses it as UTF-8 JSON
pub fn decode_segment_json(v: &str) -> Result<serde_json::Value, Error> {
    let raw = decode_segment(v)?;
    serde_json::from_slice(&raw).map_err(|e| Error::Format(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_segment_ok() {
        assert_eq!(decode_segment("aGVsbG8").unwrap(), b"hello");
    }

    #[test]
    fn decode_segment_rejects_padding() {
        // JWT segments are unpadded; a stray '=' is a format error
        assert!(decode_segment("aGVsbG8=").is_err());
    }

    #[test]
    fn decode_standard_accepts_both_paddings() {
        assert_eq!(decode_standard("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(decode_standard("aGVsbG8").unwrap(), b"hello");
    }

    #[test]
    fn decode_segment_json_ok() {
        // {"iss":"x"}
        let v = decode_segment_json("eyJpc3MiOiJ4In0").unwrap();
        assert_eq!(v["iss"], "x");
    }
}
