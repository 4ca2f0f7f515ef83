use std::fmt;

use tracing::{debug, trace};
use uuid::Uuid;

use crate::aead::AeadCipher;
use crate::keys::KeyMaterial;
use crate::signer::IvSigner;
use crate::token::{self, TextLengthRange};
use crate::{Config, Error, IdCodec, U64Codec, UuidCodec};

/// Encrypts clear-text IDs into URL safe tokens and back.
///
/// Built once from a [`Config`] and an [`IdCodec`]; afterwards it holds no mutable
/// state, so a single instance can be shared between threads (`SafeId<C>` is
/// `Send + Sync` whenever `C` is).
pub struct SafeId<C> {
    codec: C,
    signer: IvSigner,
    cipher: AeadCipher,
    token_lengths: TextLengthRange,
}

impl<C: IdCodec> SafeId<C> {
    /// Creates a new `SafeId` for the identifiers understood by `codec`.
    ///
    /// Derives the signing key from the root key in `config`. Per-message encryption
    /// keys are derived later, one per IV.
    ///
    /// **Security note:** In order to be secure, you must provide a secure random
    /// root key with sufficient entropy, and manage it appropriately. Changing the key
    /// changes every token.
    ///
    /// # Arguments
    ///
    /// * `codec` - Converts clear-text IDs to and from binary buffers.
    /// * `config` - Holds the root key and HKDF labels.
    ///
    /// # Returns
    ///
    /// The new instance, or [`Error::KeyImport`] if the root key is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use safeid_rs::{Config, SafeId, UuidCodec};
    ///
    /// let safe_id = SafeId::new(UuidCodec, &Config::new(b"your-secure-key".to_vec())).unwrap();
    /// ```
    pub fn new(codec: C, config: &Config) -> Result<SafeId<C>, Error> {
        let keys = KeyMaterial::import(config)?;
        let signer = IvSigner::new(&*keys.signing_key()?)?;
        let range = codec.valid_byte_length_range();
        let token_lengths = TextLengthRange::for_plaintext(range);
        trace!(
            min_bytes = range.min,
            max_bytes = ?range.max,
            min_chars = token_lengths.min,
            max_chars = ?token_lengths.max,
            "safe ID ready"
        );
        Ok(SafeId {
            codec,
            signer,
            cipher: AeadCipher::new(keys),
            token_lengths,
        })
    }

    /// Encrypts a clear-text ID into a token.
    ///
    /// The IV is an HMAC of the ID's binary form, so the same ID always gives the
    /// same token under the same key.
    ///
    /// # Arguments
    ///
    /// * `clear_id` - An ID accepted by the codec.
    ///
    /// # Returns
    ///
    /// The base64url token, or [`Error::Format`] if the codec rejects the ID.
    ///
    /// # Examples
    ///
    /// ```
    /// use safeid_rs::{Config, SafeId, UuidCodec};
    ///
    /// let safe_id = SafeId::new(UuidCodec, &Config::new(vec![0u8; 8])).unwrap();
    /// let token = safe_id.encrypt_id("00000000-0000-0000-0000-000000000000").unwrap();
    ///
    /// assert_eq!(token, "u2XfZ3VqX64X5XctPfzui88Vt6Z7BO22M39p_Q5oWoFL4bYd");
    /// ```
    pub fn encrypt_id(&self, clear_id: &str) -> Result<String, Error> {
        let plaintext = self.codec.to_buffer(clear_id)?;
        if !self.codec.valid_byte_length_range().contains(plaintext.len()) {
            debug!(
                length = plaintext.len(),
                "codec produced a buffer outside its declared range"
            );
            return Err(Error::Format("ID buffer length outside codec range"));
        }

        let iv = self.signer.compute_iv(&plaintext);
        let ciphertext = self.cipher.encrypt(&plaintext, &iv)?;
        Ok(token::encode(&iv, &ciphertext))
    }

    /// Decrypts a token back into the clear-text ID.
    ///
    /// The token's length and alphabet are checked before any key is used. After
    /// AES-GCM authentication the plaintext must also reproduce the IV it was
    /// sealed under, and finally pass the codec's own validation.
    ///
    /// # Arguments
    ///
    /// * `token` - Untrusted token text.
    ///
    /// # Returns
    ///
    /// The clear-text ID, or [`Error::Format`], [`Error::Authentication`] or
    /// [`Error::Integrity`]. Never a partial or default value.
    ///
    /// # Examples
    ///
    /// ```
    /// use safeid_rs::{Config, SafeId, UuidCodec};
    ///
    /// let safe_id = SafeId::new(UuidCodec, &Config::new(vec![0u8; 8])).unwrap();
    /// let decrypted = safe_id.decrypt_id("u2XfZ3VqX64X5XctPfzui88Vt6Z7BO22M39p_Q5oWoFL4bYd").unwrap();
    ///
    /// assert_eq!(decrypted, "00000000-0000-0000-0000-000000000000");
    /// ```
    pub fn decrypt_id(&self, token: &str) -> Result<String, Error> {
        let (iv, ciphertext) = token::decode(token, self.token_lengths).map_err(|err| {
            debug!(stage = "format", length = token.len(), "rejected encrypted ID");
            err
        })?;

        let plaintext = self.cipher.decrypt(&ciphertext, &iv).map_err(|err| {
            debug!(stage = "authentication", "rejected encrypted ID");
            err
        })?;

        if !self.signer.verify_iv(&plaintext, &iv) {
            debug!(stage = "integrity", "rejected encrypted ID");
            return Err(Error::Integrity);
        }

        self.codec.from_buffer(&plaintext).map_err(|err| {
            debug!(stage = "codec", error = %err, "rejected encrypted ID");
            err
        })
    }

    /// The codec this instance was built with.
    pub fn codec(&self) -> &C {
        &self.codec
    }
}

impl SafeId<UuidCodec> {
    /// Encrypts a [`Uuid`] into a token. Same as `encrypt_id` on its hyphenated form.
    pub fn encrypt_uuid(&self, uuid: &Uuid) -> Result<String, Error> {
        self.encrypt_id(&uuid.hyphenated().to_string())
    }

    /// Decrypts a token into a [`Uuid`].
    pub fn decrypt_uuid(&self, token: &str) -> Result<Uuid, Error> {
        let text = self.decrypt_id(token)?;
        Uuid::try_parse(&text).map_err(|_| Error::Format("Invalid UUID after decryption"))
    }
}

impl SafeId<U64Codec> {
    /// Encrypts an integer ID into a token.
    pub fn encrypt_u64(&self, num: u64) -> Result<String, Error> {
        self.encrypt_id(&num.to_string())
    }

    /// Decrypts a token into an integer ID.
    pub fn decrypt_u64(&self, token: &str) -> Result<u64, Error> {
        let text = self.decrypt_id(token)?;
        text.parse()
            .map_err(|_| Error::Format("Invalid integer after decryption"))
    }
}

impl<C: fmt::Debug> fmt::Debug for SafeId<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SafeId")
            .field("codec", &self.codec)
            .field("token_lengths", &self.token_lengths)
            .finish_non_exhaustive()
    }
}
