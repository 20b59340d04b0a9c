//! Binary blob encoding for wire documents.
//!
//! JSON has no byte-string type, so `GetBrick`'s voxel payload travels as
//! base64 text (spec.md §9, open question (b)) the same way
//! `trinity-transport`'s debug channel already carries screenshot PNGs as
//! `png_base64`. These two functions are the single place that convention
//! is implemented, so every command that ever needs to move raw bytes goes
//! through it instead of re-deriving the choice.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::core::error::Error;

pub fn encode_bin(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_bin(encoded: &str) -> Result<Vec<u8>, Error> {
    STANDARD
        .decode(encoded)
        .map_err(|e| Error::Protocol(format!("invalid base64 payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_bytes() {
        let bytes: Vec<u8> = (0..=255).collect();
        let encoded = encode_bin(&bytes);
        let decoded = decode_bin(&encoded).unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn rejects_malformed_base64() {
        assert!(decode_bin("not valid base64!!").is_err());
    }
}
