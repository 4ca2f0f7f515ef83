//! AES-256-GCM with a 96-bit nonce and a 64-bit tag, no associated data.
//!
//! The `aes-gcm` crate only offers 12 to 16 byte tags, so GCM is assembled here from
//! its parts: AES-CTR with a 32-bit big-endian counter for confidentiality and GHASH
//! for the tag. The tag is the standard 128-bit GCM tag truncated to its first
//! [`TAG_LENGTH`] bytes, so the output is interoperable with any GCM implementation
//! configured for 64-bit tags.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit, KeyIvInit, StreamCipher};
use aes::{Aes256, Block};
use ghash::universal_hash::UniversalHash;
use ghash::GHash;
use zeroize::Zeroize;

use crate::keys::{KeyMaterial, KEY_LENGTH};
use crate::signer::{constant_time_eq, Iv};
use crate::Error;

type Aes256Ctr32 = ctr::Ctr32BE<Aes256>;

/// Bytes of the GCM tag appended to the ciphertext.
pub(crate) const TAG_LENGTH: usize = 8;

/// Seals and opens plaintexts under per-message keys derived from the IV.
pub(crate) struct AeadCipher {
    keys: KeyMaterial,
}

impl AeadCipher {
    pub(crate) fn new(keys: KeyMaterial) -> AeadCipher {
        AeadCipher { keys }
    }

    /// Returns `ciphertext ‖ tag`.
    pub(crate) fn encrypt(&self, plaintext: &[u8], iv: &Iv) -> Result<Vec<u8>, Error> {
        let key = self.keys.encryption_key(iv)?;
        Ok(seal(&key, iv, plaintext))
    }

    /// Opens `ciphertext ‖ tag`. The `iv` is untrusted input taken from the token.
    pub(crate) fn decrypt(&self, ciphertext_with_tag: &[u8], iv: &Iv) -> Result<Vec<u8>, Error> {
        let key = self.keys.encryption_key(iv)?;
        open(&key, iv, ciphertext_with_tag)
    }
}

struct Gcm {
    ghash: GHash,
    tag_mask: Block,
    ctr: Aes256Ctr32,
}

impl Gcm {
    fn new(key: &[u8; KEY_LENGTH], iv: &Iv) -> Gcm {
        let key = GenericArray::from_slice(key);
        let cipher = Aes256::new(key);

        let mut ghash_key = Block::default();
        cipher.encrypt_block(&mut ghash_key);

        // J0 = IV ‖ 0^31 ‖ 1 for 96-bit IVs. The tag is masked with E(K, J0) and
        // the keystream starts at inc32(J0).
        let mut j0 = Block::default();
        j0[..iv.len()].copy_from_slice(iv);
        j0[15] = 1;
        let mut tag_mask = j0;
        cipher.encrypt_block(&mut tag_mask);
        let mut counter = j0;
        counter[15] = 2;

        Gcm {
            ghash: GHash::new(&ghash_key),
            tag_mask,
            ctr: Aes256Ctr32::new(key, &counter),
        }
    }

    fn tag(&self, ciphertext: &[u8]) -> Block {
        let mut ghash = self.ghash.clone();
        ghash.update_padded(ciphertext);

        // len(A) is always zero.
        let mut lengths = Block::default();
        lengths[8..].copy_from_slice(&((ciphertext.len() as u64) * 8).to_be_bytes());
        ghash.update(&[lengths]);

        let mut tag = ghash.finalize();
        for (t, m) in tag.iter_mut().zip(self.tag_mask.iter()) {
            *t ^= *m;
        }
        tag
    }
}

// The AES key schedule, CTR state and GHASH key wipe themselves through their
// `zeroize` features. The tag mask is a plain block.
impl Drop for Gcm {
    fn drop(&mut self) {
        self.tag_mask.as_mut_slice().zeroize();
    }
}

fn seal(key: &[u8; KEY_LENGTH], iv: &Iv, plaintext: &[u8]) -> Vec<u8> {
    let mut gcm = Gcm::new(key, iv);
    let mut buffer = Vec::with_capacity(plaintext.len() + TAG_LENGTH);
    buffer.extend_from_slice(plaintext);
    gcm.ctr.apply_keystream(&mut buffer);
    let tag = gcm.tag(&buffer);
    buffer.extend_from_slice(&tag[..TAG_LENGTH]);
    buffer
}

fn open(key: &[u8; KEY_LENGTH], iv: &Iv, ciphertext_with_tag: &[u8]) -> Result<Vec<u8>, Error> {
    if ciphertext_with_tag.len() < TAG_LENGTH {
        return Err(Error::Authentication);
    }
    let (ciphertext, received_tag) =
        ciphertext_with_tag.split_at(ciphertext_with_tag.len() - TAG_LENGTH);

    let mut gcm = Gcm::new(key, iv);
    let tag = gcm.tag(ciphertext);
    if !constant_time_eq(&tag[..TAG_LENGTH], received_tag) {
        return Err(Error::Authentication);
    }

    let mut buffer = ciphertext.to_vec();
    gcm.ctr.apply_keystream(&mut buffer);
    Ok(buffer)
}
