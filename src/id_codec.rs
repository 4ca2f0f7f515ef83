use crate::Error;

/// Inclusive range of plaintext buffer lengths a codec produces.
///
/// `max: None` means unbounded. The default is `[0, ∞)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteLengthRange {
    pub min: usize,
    pub max: Option<usize>,
}

impl ByteLengthRange {
    /// A fixed-length codec: `[length, length]`.
    pub const fn exact(length: usize) -> Self {
        ByteLengthRange {
            min: length,
            max: Some(length),
        }
    }

    pub const fn new(min: usize, max: Option<usize>) -> Self {
        ByteLengthRange { min, max }
    }

    pub fn contains(&self, length: usize) -> bool {
        length >= self.min && self.max.map_or(true, |max| length <= max)
    }
}

/// Converts one family of clear-text identifiers to and from the binary buffer
/// that gets encrypted.
///
/// Implementations must be injective: two different accepted IDs must never map
/// to the same buffer. `from_buffer` receives authenticated plaintext and should
/// still validate it, returning [`Error::Format`] for anything it would not
/// have produced itself.
pub trait IdCodec {
    /// Validates `clear_id` and returns its binary form.
    fn to_buffer(&self, clear_id: &str) -> Result<Vec<u8>, Error>;

    /// Rebuilds the clear-text ID from a decrypted buffer.
    fn from_buffer(&self, buffer: &[u8]) -> Result<String, Error>;

    /// Lengths `to_buffer` can produce. Used to reject tokens before decryption.
    fn valid_byte_length_range(&self) -> ByteLengthRange {
        ByteLengthRange::default()
    }
}

impl<C: IdCodec + ?Sized> IdCodec for &C {
    fn to_buffer(&self, clear_id: &str) -> Result<Vec<u8>, Error> {
        (**self).to_buffer(clear_id)
    }

    fn from_buffer(&self, buffer: &[u8]) -> Result<String, Error> {
        (**self).from_buffer(buffer)
    }

    fn valid_byte_length_range(&self) -> ByteLengthRange {
        (**self).valid_byte_length_range()
    }
}

impl<C: IdCodec + ?Sized> IdCodec for Box<C> {
    fn to_buffer(&self, clear_id: &str) -> Result<Vec<u8>, Error> {
        (**self).to_buffer(clear_id)
    }

    fn from_buffer(&self, buffer: &[u8]) -> Result<String, Error> {
        (**self).from_buffer(buffer)
    }

    fn valid_byte_length_range(&self) -> ByteLengthRange {
        (**self).valid_byte_length_range()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Hex;

    impl IdCodec for Hex {
        fn to_buffer(&self, clear_id: &str) -> Result<Vec<u8>, Error> {
            if clear_id.len() % 2 != 0 {
                return Err(Error::Format("odd length"));
            }
            (0..clear_id.len())
                .step_by(2)
                .map(|i| {
                    u8::from_str_radix(&clear_id[i..i + 2], 16).map_err(|_| Error::Format("bad hex"))
                })
                .collect()
        }

        fn from_buffer(&self, buffer: &[u8]) -> Result<String, Error> {
            Ok(buffer.iter().map(|b| format!("{:02x}", b)).collect())
        }
    }

    #[test]
    fn test_range() {
        assert_eq!(ByteLengthRange::default(), ByteLengthRange::new(0, None));
        assert!(ByteLengthRange::default().contains(usize::MAX));
        assert!(ByteLengthRange::exact(16).contains(16));
        assert!(!ByteLengthRange::exact(16).contains(15));
        assert!(!ByteLengthRange::exact(16).contains(17));
        assert!(ByteLengthRange::new(4, Some(8)).contains(6));
    }

    #[test]
    fn test_default_range_and_forwarding() {
        assert_eq!(Hex.valid_byte_length_range(), ByteLengthRange::default());

        let boxed: Box<dyn IdCodec> = Box::new(Hex);
        assert_eq!(boxed.to_buffer("00ff").unwrap(), vec![0x00, 0xff]);
        assert_eq!((&Hex).from_buffer(&[0xab]).unwrap(), "ab");
        assert_eq!(boxed.to_buffer("0"), Err(Error::Format("odd length")));
    }
}
