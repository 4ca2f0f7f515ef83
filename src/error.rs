use thiserror::Error;

/// Message used for every token that fails the shape checks.
pub(crate) const INVALID_TOKEN: &str = "Invalid encrypted ID";

/// Error returned by [`SafeId`](crate::SafeId) and the [`IdCodec`](crate::IdCodec)
/// implementations.
///
/// The messages are safe to show to untrusted callers: authentication and integrity
/// failures carry no detail about which bytes were wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed clear ID, malformed token text, or a length outside the codec's range.
    #[error("{0}")]
    Format(&'static str),

    /// The AES-GCM tag did not verify.
    #[error("Encrypted ID failed authentication")]
    Authentication,

    /// The decrypted plaintext does not reproduce the IV it was sealed under.
    #[error("Decrypted plaintext does not reproduce IV")]
    Integrity,

    /// The root secret could not be used as key material.
    ///
    /// [`Field`](crate::Field) also reports an unset global configuration and an
    /// empty [`TypeMarker`](crate::TypeMarker) name this way, since both leave it
    /// without a key to derive from.
    #[error("Invalid root secret: {0}")]
    KeyImport(&'static str),
}

impl Error {
    /// Returns true for every error `decrypt_id` reports about an untrusted token.
    ///
    /// Useful for collapsing all rejections into one response, e.g. a 404.
    pub fn is_rejected_token(&self) -> bool {
        matches!(
            self,
            Error::Format(_) | Error::Authentication | Error::Integrity
        )
    }
}
