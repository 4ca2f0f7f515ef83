use crate::{ByteLengthRange, Error, IdCodec};

const INVALID_NUMBER: &str = "Invalid ID format (expected unsigned integer)";
const INVALID_LENGTH: &str = "Invalid raw integer after decryption (invalid length)";

/// Codec for integer database IDs written as canonical unsigned decimal text.
///
/// `"0"` and digits without a leading zero, up to `u64::MAX`. The buffer is the
/// 8 big-endian bytes of the number.
#[derive(Debug, Clone, Copy, Default)]
pub struct U64Codec;

impl IdCodec for U64Codec {
    fn to_buffer(&self, clear_id: &str) -> Result<Vec<u8>, Error> {
        parse(clear_id)
            .map(|num| num.to_be_bytes().to_vec())
            .ok_or(Error::Format(INVALID_NUMBER))
    }

    fn from_buffer(&self, buffer: &[u8]) -> Result<String, Error> {
        let bytes: [u8; 8] = buffer
            .try_into()
            .map_err(|_| Error::Format(INVALID_LENGTH))?;
        Ok(u64::from_be_bytes(bytes).to_string())
    }

    fn valid_byte_length_range(&self) -> ByteLengthRange {
        ByteLengthRange::exact(8)
    }
}

// `str::parse` alone would also take "+1" and "007", giving one number several
// clear-text spellings.
fn parse(text: &str) -> Option<u64> {
    let canonical = !text.is_empty()
        && text.bytes().all(|b| b.is_ascii_digit())
        && (text == "0" || !text.starts_with('0'));
    if canonical {
        text.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for text in ["0", "1", "12345", "18446744073709551615"] {
            let buffer = U64Codec.to_buffer(text).unwrap();
            assert_eq!(buffer.len(), 8);
            assert_eq!(U64Codec.from_buffer(&buffer).unwrap(), text);
        }
        assert_eq!(
            U64Codec.to_buffer("258").unwrap(),
            vec![0, 0, 0, 0, 0, 0, 1, 2]
        );
    }

    #[test]
    fn test_rejected() {
        for text in ["", "-1", "+1", "007", "1.0", " 1", "18446744073709551616", "abc"] {
            assert_eq!(
                U64Codec.to_buffer(text),
                Err(Error::Format(INVALID_NUMBER)),
                "{:?}",
                text
            );
        }
        assert_eq!(
            U64Codec.from_buffer(&[1, 2, 3]),
            Err(Error::Format(INVALID_LENGTH))
        );
    }
}
