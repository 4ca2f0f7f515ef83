use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::aead::TAG_LENGTH;
use crate::error::INVALID_TOKEN;
use crate::signer::{Iv, IV_LENGTH};
use crate::{ByteLengthRange, Error};

/// Token lengths, in characters, accepted for a codec's plaintext byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TextLengthRange {
    pub(crate) min: usize,
    pub(crate) max: Option<usize>,
}

impl TextLengthRange {
    pub(crate) fn for_plaintext(range: ByteLengthRange) -> TextLengthRange {
        TextLengthRange {
            min: text_length(range.min).unwrap_or(usize::MAX),
            max: range.max.and_then(text_length),
        }
    }

    pub(crate) fn contains(&self, length: usize) -> bool {
        length >= self.min && self.max.map_or(true, |max| length <= max)
    }
}

/// Length of the unpadded base64url text for a plaintext of `byte_length` bytes:
/// `ceil((byte_length + 12 + 8) * 8 / 6)`. `None` if it does not fit in a `usize`.
pub(crate) fn text_length(byte_length: usize) -> Option<usize> {
    let bits = byte_length
        .checked_add(IV_LENGTH + TAG_LENGTH)?
        .checked_mul(8)?;
    Some(bits.div_ceil(6))
}

pub(crate) fn encode(iv: &Iv, ciphertext_with_tag: &[u8]) -> String {
    let mut raw = Vec::with_capacity(iv.len() + ciphertext_with_tag.len());
    raw.extend_from_slice(iv);
    raw.extend_from_slice(ciphertext_with_tag);
    URL_SAFE_NO_PAD.encode(raw)
}

/// Checks the token shape and splits it into the IV and `ciphertext ‖ tag`.
///
/// Runs before any key material is touched; every failure is the same
/// [`Error::Format`].
pub(crate) fn decode(token: &str, lengths: TextLengthRange) -> Result<(Iv, Vec<u8>), Error> {
    if !lengths.contains(token.len()) || !is_token_alphabet(token) {
        return Err(Error::Format(INVALID_TOKEN));
    }

    let raw = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| Error::Format(INVALID_TOKEN))?;
    if raw.len() < IV_LENGTH + TAG_LENGTH {
        return Err(Error::Format(INVALID_TOKEN));
    }

    let (iv_bytes, ciphertext_with_tag) = raw.split_at(IV_LENGTH);
    let mut iv = [0u8; IV_LENGTH];
    iv.copy_from_slice(iv_bytes);
    Ok((iv, ciphertext_with_tag.to_vec()))
}

fn is_token_alphabet(token: &str) -> bool {
    !token.is_empty()
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNBOUNDED: TextLengthRange = TextLengthRange { min: 27, max: None };

    #[test]
    fn test_text_length() {
        assert_eq!(text_length(0), Some(27));
        assert_eq!(text_length(8), Some(38));
        assert_eq!(text_length(16), Some(48));
        assert_eq!(text_length(usize::MAX), None);
    }

    #[test]
    fn test_length_range() {
        let uuid = TextLengthRange::for_plaintext(ByteLengthRange::exact(16));
        assert_eq!(uuid, TextLengthRange { min: 48, max: Some(48) });
        assert!(uuid.contains(48));
        assert!(!uuid.contains(47));
        assert!(!uuid.contains(49));

        assert_eq!(
            TextLengthRange::for_plaintext(ByteLengthRange::default()),
            UNBOUNDED
        );
        assert!(UNBOUNDED.contains(10_000));
    }

    #[test]
    fn test_encode_decode() {
        let iv = [0xfbu8; IV_LENGTH];
        let body = [0xffu8; 24];
        let token = encode(&iv, &body);
        assert_eq!(token.len(), 48);
        assert!(token.contains('_') || token.contains('-'));

        let lengths = TextLengthRange::for_plaintext(ByteLengthRange::exact(16));
        assert_eq!(decode(&token, lengths).unwrap(), (iv, body.to_vec()));
    }

    #[test]
    fn test_decode_errors() {
        let lengths = TextLengthRange::for_plaintext(ByteLengthRange::exact(16));
        let valid = "u2XfZ3VqX64X5XctPfzui88Vt6Z7BO22M39p_Q5oWoFL4bYd";
        assert!(decode(valid, lengths).is_ok());

        let invalid = [
            "",
            &valid[..47],
            "u2XfZ3VqX64X5XctPfzui88Vt6Z7BO22M39p_Q5oWoFL4bYdA",
            "u2XfZ3VqX64X5XctPfzui88Vt6Z7BO22M39p/Q5oWoFL4bYd",
            "u2XfZ3VqX64X5XctPfzui88Vt6Z7BO22M39p+Q5oWoFL4bYd",
            "u2XfZ3VqX64X5XctPfzui88Vt6Z7BO22M39p_Q5oWoFL4b==",
            "u2XfZ3VqX64X5XctPfzui88Vt6Z7BO22M39p_Q5oWoFL4bY\u{e9}",
        ];
        for token in invalid {
            assert_eq!(
                decode(token, lengths),
                Err(Error::Format(INVALID_TOKEN)),
                "token {:?}",
                token
            );
        }

        // Unpadded base64 cannot have a length of 1 mod 4.
        assert_eq!(
            decode(&"A".repeat(29), UNBOUNDED),
            Err(Error::Format(INVALID_TOKEN))
        );
    }
}
