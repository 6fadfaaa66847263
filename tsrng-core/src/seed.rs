// Beacon seed parsing (C2).
//
// Accepts whatever a beacon's HTTP response body looks like and recovers
// raw seed bytes. Mirrors the original service's `parse_seed`: try JSON
// unwrapping, then hex, then base64 (standard and URL-safe), and only
// fall back to hashing the literal string if nothing else decodes.

use crate::hash::h256;

/// Parses a beacon seed string into raw bytes.
///
/// Preconditions: none; any string is accepted, including malformed JSON
/// or non-hex/non-base64 text.
///
/// Postconditions: always returns bytes (the SHA3-256 fallback never
/// fails), so this function has no error path.
pub fn parse_seed(input: &str) -> Vec<u8> {
    let mut s = input.trim().to_string();

    if s.starts_with('{') {
        if let Ok(serde_json::Value::Object(obj)) = serde_json::from_str::<serde_json::Value>(&s)
        {
            if let Some(randomness) = obj.get("randomness").and_then(|v| v.as_str()) {
                s = randomness.trim().to_string();
            } else if let Some(serde_json::Value::Object(pulse)) = obj.get("pulse") {
                let value = pulse
                    .get("outputValue")
                    .and_then(|v| v.as_str())
                    .or_else(|| pulse.get("seedValue").and_then(|v| v.as_str()))
                    .unwrap_or("");
                s = value.trim().to_string();
            }
        }
    }

    if s.len() >= 2 && s[..2].eq_ignore_ascii_case("0x") {
        s = s[2..].to_string();
    }

    if let Ok(bytes) = hex::decode(&s) {
        return bytes;
    }

    if let Some(bytes) = try_base64(&s) {
        return bytes;
    }

    h256(s.as_bytes()).to_vec()
}

fn try_base64(s: &str) -> Option<Vec<u8>> {
    use base64::engine::general_purpose::{STANDARD, URL_SAFE};
    use base64::Engine as _;

    let padded = pad_base64(s);
    if let Ok(bytes) = STANDARD.decode(&padded) {
        return Some(bytes);
    }
    if let Ok(bytes) = URL_SAFE.decode(&padded) {
        return Some(bytes);
    }
    None
}

fn pad_base64(s: &str) -> String {
    let remainder = s.len() % 4;
    if remainder == 0 {
        s.to_string()
    } else {
        let mut out = s.to_string();
        out.extend(std::iter::repeat('=').take(4 - remainder));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_hex() {
        let bytes = parse_seed("deadbeef");
        assert_eq!(bytes, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn parses_0x_prefixed_hex() {
        let bytes = parse_seed("0xDEADBEEF");
        assert_eq!(bytes, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn parses_drand_json() {
        let bytes = parse_seed(r#"{"randomness": "deadbeef"}"#);
        assert_eq!(bytes, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn parses_nist_pulse_json() {
        let bytes = parse_seed(r#"{"pulse": {"outputValue": "deadbeef"}}"#);
        assert_eq!(bytes, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn parses_nist_pulse_seed_value_fallback() {
        let bytes = parse_seed(r#"{"pulse": {"seedValue": "deadbeef"}}"#);
        assert_eq!(bytes, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn parses_base64_without_padding() {
        // "deadbeef" hex == [0xde,0xad,0xbe,0xef]; base64 without padding.
        let b64 = "3q2-7w";
        let bytes = parse_seed(b64);
        assert_eq!(bytes, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn unparseable_string_falls_back_to_hash() {
        let bytes = parse_seed("not hex, not base64, not json!!");
        assert_eq!(bytes, h256(b"not hex, not base64, not json!!").to_vec());
    }

    #[test]
    fn fallback_is_deterministic() {
        let a = parse_seed("some random beacon text");
        let b = parse_seed("some random beacon text");
        assert_eq!(a, b);
    }
}
