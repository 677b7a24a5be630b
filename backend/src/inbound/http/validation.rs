//! Small parsing helpers shared by the HTTP handlers.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::domain::Error;

/// Decode a standard-alphabet base64 field.
pub fn decode_base64(field: &str, raw: &str) -> Result<Vec<u8>, Error> {
    STANDARD
        .decode(raw)
        .map_err(|_| Error::invalid_request(format!("{field} must be base64")))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn base64_decoding_rejects_garbage() {
        assert_eq!(
            decode_base64("content", "aGVsbG8=").expect("valid"),
            b"hello".to_vec()
        );
        assert!(decode_base64("content", "%%%").is_err());
    }
}
