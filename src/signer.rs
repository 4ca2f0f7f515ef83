use std::hint::black_box;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::keys::KEY_LENGTH;
use crate::Error;

type HmacSha256 = Hmac<Sha256>;

/// Bytes of the HMAC kept as the AES-GCM nonce.
pub(crate) const IV_LENGTH: usize = 12;

pub(crate) type Iv = [u8; IV_LENGTH];

/// Derives the deterministic per-message IV: HMAC-SHA-256 over the plaintext,
/// truncated to [`IV_LENGTH`] bytes.
///
/// The keyed HMAC state is held for the facade's lifetime. `hmac` has no `zeroize`
/// support, so this state is not wiped on drop.
pub(crate) struct IvSigner {
    hmac: HmacSha256,
}

impl IvSigner {
    pub(crate) fn new(signing_key: &[u8; KEY_LENGTH]) -> Result<IvSigner, Error> {
        let hmac = HmacSha256::new_from_slice(signing_key)
            .map_err(|_| Error::KeyImport("signing key rejected by HMAC"))?;
        Ok(IvSigner { hmac })
    }

    pub(crate) fn compute_iv(&self, plaintext: &[u8]) -> Iv {
        let mut hmac = self.hmac.clone();
        hmac.update(plaintext);
        let digest = hmac.finalize().into_bytes();
        let mut iv = [0u8; IV_LENGTH];
        iv.copy_from_slice(&digest[..IV_LENGTH]);
        iv
    }

    /// Checks that `plaintext` reproduces `iv`, in time independent of where they differ.
    pub(crate) fn verify_iv(&self, plaintext: &[u8], iv: &[u8]) -> bool {
        constant_time_eq(&self.compute_iv(plaintext), iv)
    }
}

/// Compares two byte strings by OR-accumulating the XOR of every byte pair and
/// testing the accumulator once at the end. Never short-circuits on content.
///
/// Only the lengths, which are public, may cause an early return.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a
        .iter()
        .zip(b)
        .fold(0u8, |acc, (x, y)| black_box(acc | (x ^ y)));
    diff == 0
}
