//! `safeid` offers secure encryption and decryption of internal identifiers (UUIDs,
//! integer IDs, anything with a binary form) into URL safe tokens and back, and a generic
//! field type to conveniently manage the process with Serde and Diesel.
//!
//! This library is primarily designed to encrypt raw database IDs in your API, and to
//! transform them into opaque, URL-safe tokens. An attacker who sees many tokens cannot
//! enumerate valid IDs, spot sequential relationships, or tell "exists" from "doesn't
//! exist" by timing. It is the authentication tag, not the encryption, that makes forged
//! tokens indistinguishable from random ones: every token is checked before any lookup.
//!
//! # Construction
//!
//! From one root secret, HKDF-SHA256 derives a signing key (empty salt, label
//! `safeid#sign`). For each ID:
//!
//! 1. the [`IdCodec`] turns the clear-text ID into a byte buffer,
//! 2. the IV is the first 12 bytes of HMAC-SHA256(signing key, buffer),
//! 3. the buffer is sealed with AES-256-GCM and a 64-bit tag, under a key derived with
//!    HKDF-SHA256 from the root secret (salt = IV, label `safeid#encrypt`),
//! 4. the token is `base64url(IV ‖ ciphertext ‖ tag)` without padding.
//!
//! Decryption reverses this and additionally checks that the plaintext reproduces the IV.
//!
//! Encryption is deterministic: the same ID always yields the same token under the same
//! key. Tokens hide the ID, but not whether two tokens refer to the same ID.
//!
//! Please note that leaking the root key means you lose all the security benefits.
//! Anyone can then decrypt and encrypt your IDs. You also cannot change the key, unless
//! it's OK that all exposed tokens change.
//!
//! # Usage
//!
//! ## Low level API
//!
//! [`SafeId`] encrypts and decrypts IDs for one [`IdCodec`].
//!
//! ```
//! use safeid_rs::{Config, SafeId, UuidCodec};
//!
//! let safe_id = SafeId::new(UuidCodec, &Config::new(vec![0u8; 8])).unwrap();
//! let token = safe_id.encrypt_id("00000000-0000-0000-0000-000000000000").unwrap();
//! let decrypted = safe_id.decrypt_id(&token).unwrap();
//! assert_eq!(token, "u2XfZ3VqX64X5XctPfzui88Vt6Z7BO22M39p_Q5oWoFL4bYd");
//! assert_eq!(decrypted, "00000000-0000-0000-0000-000000000000");
//! ```
//!
//! Any identifier family can be plugged in by implementing [`IdCodec`]:
//!
//! ```
//! use safeid_rs::{ByteLengthRange, Config, Error, IdCodec, SafeId};
//!
//! struct Sku;
//!
//! impl IdCodec for Sku {
//!     fn to_buffer(&self, clear_id: &str) -> Result<Vec<u8>, Error> {
//!         if clear_id.len() == 6 && clear_id.bytes().all(|b| b.is_ascii_uppercase()) {
//!             Ok(clear_id.as_bytes().to_vec())
//!         } else {
//!             Err(Error::Format("Invalid SKU"))
//!         }
//!     }
//!
//!     fn from_buffer(&self, buffer: &[u8]) -> Result<String, Error> {
//!         let text = String::from_utf8(buffer.to_vec()).map_err(|_| Error::Format("Invalid SKU"))?;
//!         self.to_buffer(&text)?;
//!         Ok(text)
//!     }
//!
//!     fn valid_byte_length_range(&self) -> ByteLengthRange {
//!         ByteLengthRange::exact(6)
//!     }
//! }
//!
//! let safe_id = SafeId::new(Sku, &Config::new(b"your-secure-key".to_vec())).unwrap();
//! let token = safe_id.encrypt_id("ABCDEF").unwrap();
//! assert_eq!(safe_id.decrypt_id(&token).unwrap(), "ABCDEF");
//! assert!(safe_id.decrypt_id("ABCDEF").is_err());
//! ```
//!
//! ##  Generic `Field` API
//!
//! Use the generic `Field` type to define a type for each type of object you're exposing
//! in your public APIs. Each type gets its own key namespace.
//!
//! ```
//! use safeid_rs;
//!
//! #[derive(Debug)]
//! pub struct ExampleIdMarker;
//! impl safeid_rs::TypeMarker for ExampleIdMarker {
//!     fn name() -> &'static str { "example" }
//! }
//!
//! type ExampleId = safeid_rs::Field<ExampleIdMarker>;
//!
//! #[derive(serde::Serialize)]
//! struct Example {
//!     pub id: ExampleId,
//! }
//!
//! safeid_rs::Config::set_global(safeid_rs::Config::new(vec![0u8; 8]));
//! let obj = Example { id: ExampleId::from(uuid::Uuid::nil()) };
//! let obj_str = serde_json::to_string(&obj).unwrap();
//! assert_eq!(obj_str, "{\"id\":\"THnd2PRPndQ2VU8ks6OXamiajo8yzZEgS4pxwo5qgqVOzNMW\"}");
//! ```

mod aead;
mod config;
mod error;
mod field;
mod id_codec;
mod keys;
mod safe_id;
mod signer;
mod token;
mod u64_codec;
mod uuid_codec;

pub use config::{Config, ConfigError};
pub use error::Error;
pub use field::{Field, TypeMarker};
pub use id_codec::{ByteLengthRange, IdCodec};
pub use safe_id::SafeId;
pub use u64_codec::U64Codec;
pub use uuid_codec::UuidCodec;
