use uuid::Uuid;

use crate::{ByteLengthRange, Error, IdCodec};

const INVALID_UUID: &str = "Invalid ID format (expected UUID)";
const INVALID_LENGTH: &str = "Invalid raw UUID after decryption (invalid length)";
const INVALID_DECRYPTED: &str = "Invalid UUID after decryption";

const HYPHENS: [usize; 4] = [8, 13, 18, 23];

/// Codec for UUIDs in canonical `8-4-4-4-12` hyphenated hex form.
///
/// Accepts versions 1 through 8 with the RFC 4122 variant, plus the nil and max
/// UUIDs. Input is case-insensitive; decrypted UUIDs come back lowercase. The
/// buffer is the 16 bytes of the UUID in field order.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidCodec;

impl IdCodec for UuidCodec {
    fn to_buffer(&self, clear_id: &str) -> Result<Vec<u8>, Error> {
        parse(clear_id)
            .map(|uuid| uuid.as_bytes().to_vec())
            .ok_or(Error::Format(INVALID_UUID))
    }

    fn from_buffer(&self, buffer: &[u8]) -> Result<String, Error> {
        let uuid = Uuid::from_slice(buffer).map_err(|_| Error::Format(INVALID_LENGTH))?;
        let text = uuid.hyphenated().to_string();
        // Same check as on the way in, so a decrypted value can never be
        // something the codec would have refused to encrypt.
        if parse(&text).is_none() {
            return Err(Error::Format(INVALID_DECRYPTED));
        }
        Ok(text)
    }

    fn valid_byte_length_range(&self) -> ByteLengthRange {
        ByteLengthRange::exact(16)
    }
}

fn parse(text: &str) -> Option<Uuid> {
    if !is_hyphenated(text) {
        return None;
    }
    Uuid::try_parse(text).ok().filter(is_accepted)
}

fn is_hyphenated(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 36
        && bytes.iter().enumerate().all(|(i, &b)| {
            if HYPHENS.contains(&i) {
                b == b'-'
            } else {
                b.is_ascii_hexdigit()
            }
        })
}

fn is_accepted(uuid: &Uuid) -> bool {
    let value = uuid.as_u128();
    if value == 0 || value == u128::MAX {
        return true;
    }
    let bytes = uuid.as_bytes();
    let version = bytes[6] >> 4;
    let variant = bytes[8] >> 6;
    (1..=8).contains(&version) && variant == 0b10
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCEPTED: [&str; 10] = [
        "00000000-0000-0000-0000-000000000000",
        "ffffffff-ffff-ffff-ffff-ffffffffffff",
        "00000000-0000-4000-8000-000000000000",
        "123e4567-e89b-12d3-a456-426655440000",
        "00112233-4455-4677-8899-aabbccddeeff",
        "96e17d7a-ac89-38cf-95e1-bf5098da34e1",
        "e8b764da-5fe5-51ed-8af8-c5c6eca28d7a",
        "1ec9414c-232a-6b00-b3c8-9e6bdeced846",
        "017f22e2-79b0-7cc3-98c4-dc0c0c07398f",
        "320c3d4d-cc00-875b-8ec9-32d5f69181c0",
    ];

    #[test]
    fn test_accepted() {
        for text in ACCEPTED {
            let buffer = UuidCodec.to_buffer(text).unwrap();
            assert_eq!(buffer.len(), 16);
            assert_eq!(UuidCodec.from_buffer(&buffer).unwrap(), text);
        }
    }

    #[test]
    fn test_field_order() {
        let buffer = UuidCodec
            .to_buffer("00112233-4455-4677-8899-aabbccddeeff")
            .unwrap();
        assert_eq!(
            buffer,
            vec![
                0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x46, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
                0xee, 0xff
            ]
        );
    }

    #[test]
    fn test_uppercase_comes_back_lowercase() {
        let buffer = UuidCodec
            .to_buffer("C232AB00-9414-11EC-B3C8-9E6BDECED846")
            .unwrap();
        assert_eq!(
            UuidCodec.from_buffer(&buffer).unwrap(),
            "c232ab00-9414-11ec-b3c8-9e6bdeced846"
        );
    }

    #[test]
    fn test_rejected() {
        let rejected = [
            "",
            "c232ab00941411ecb3c89e6bdeced846",
            "{c232ab00-9414-11ec-b3c8-9e6bdeced846}",
            "urn:uuid:c232ab00-9414-11ec-b3c8-9e6bdeced846",
            "c232ab00-9414-11ec-b3c8-9e6bdeced84",
            "c232ab00-9414-11ec-b3c8-9e6bdeced8466",
            "c232ab00-9414-11ec-b3c8-9e6bdeced84g",
            "c232ab00-9414-11ec-b3c89e6bdeced846-",
            " c232ab00-9414-11ec-b3c8-9e6bdeced84",
            // Version 0 and 9, and the wrong variant.
            "00000000-0000-0000-0000-000000000001",
            "c232ab00-9414-91ec-b3c8-9e6bdeced846",
            "c232ab00-9414-11ec-c3c8-9e6bdeced846",
            "c232ab00-9414-11ec-73c8-9e6bdeced846",
        ];
        for text in rejected {
            assert_eq!(
                UuidCodec.to_buffer(text),
                Err(Error::Format(INVALID_UUID)),
                "{:?}",
                text
            );
        }
    }

    #[test]
    fn test_from_buffer_errors() {
        assert_eq!(
            UuidCodec.from_buffer(&[0u8; 15]),
            Err(Error::Format(INVALID_LENGTH))
        );
        assert_eq!(
            UuidCodec.from_buffer(&[0u8; 17]),
            Err(Error::Format(INVALID_LENGTH))
        );
        let mut version_zero = [0u8; 16];
        version_zero[15] = 1;
        assert_eq!(
            UuidCodec.from_buffer(&version_zero),
            Err(Error::Format(INVALID_DECRYPTED))
        );
    }

    #[test]
    fn test_range() {
        assert_eq!(UuidCodec.valid_byte_length_range(), ByteLengthRange::exact(16));
    }
}
