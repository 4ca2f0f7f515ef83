use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::{Config, Error};

/// Length of every derived key: HMAC-SHA-256 keys and AES-256 keys alike.
pub(crate) const KEY_LENGTH: usize = 32;

pub(crate) type DerivedKey = Zeroizing<[u8; KEY_LENGTH]>;

/// The root secret and the two HKDF branches hanging off it.
///
/// The signing key comes from an empty salt and the signing label. Encryption keys
/// use the message IV as salt and the encryption label, so every distinct plaintext
/// is sealed under its own AES key. Only the root secret is kept; derived keys live
/// as long as the caller holds them.
pub(crate) struct KeyMaterial {
    root: Zeroizing<Vec<u8>>,
    sign_label: Vec<u8>,
    encrypt_label: Vec<u8>,
}

impl KeyMaterial {
    pub(crate) fn import(config: &Config) -> Result<KeyMaterial, Error> {
        if config.key.is_empty() {
            return Err(Error::KeyImport("root secret must not be empty"));
        }
        Ok(KeyMaterial {
            root: config.key.clone(),
            sign_label: config.sign_label.as_bytes().to_vec(),
            encrypt_label: config.encrypt_label.as_bytes().to_vec(),
        })
    }

    pub(crate) fn signing_key(&self) -> Result<DerivedKey, Error> {
        expand(None, &self.root, &self.sign_label)
    }

    /// Derives the AES-256 key for the message sealed under `iv`.
    pub(crate) fn encryption_key(&self, iv: &[u8]) -> Result<DerivedKey, Error> {
        expand(Some(iv), &self.root, &self.encrypt_label)
    }
}

fn expand(salt: Option<&[u8]>, ikm: &[u8], info: &[u8]) -> Result<DerivedKey, Error> {
    let hkdf = Hkdf::<Sha256>::new(salt, ikm);
    let mut okm = Zeroizing::new([0u8; KEY_LENGTH]);
    hkdf.expand(info, &mut okm[..])
        .map_err(|_| Error::KeyImport("HKDF expansion failed"))?;
    Ok(okm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zeroize::ZeroizeOnDrop;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    #[test]
    fn test_signing_key() {
        let keys = KeyMaterial::import(&Config::new(vec![0u8; 8])).unwrap();
        assert_eq!(
            hex(&*keys.signing_key().unwrap()),
            "41e94825b6e4f962d80b2a39931d22deedf60c7c9ff229df299cf24f400a7c80"
        );
    }

    #[test]
    fn test_derived_keys_are_wiped() {
        fn assert_zeroize_on_drop<T: ZeroizeOnDrop>() {}
        assert_zeroize_on_drop::<DerivedKey>();
        assert_zeroize_on_drop::<Zeroizing<Vec<u8>>>();

        // Nothing derived is cached: each call re-derives the same bytes.
        let keys = KeyMaterial::import(&Config::new(vec![0u8; 8])).unwrap();
        assert_eq!(*keys.signing_key().unwrap(), *keys.signing_key().unwrap());
    }

    #[test]
    fn test_empty_root_rejected() {
        assert!(matches!(
            KeyMaterial::import(&Config::new(Vec::new())),
            Err(Error::KeyImport(_))
        ));
    }

    #[test]
    fn test_branches_are_independent() {
        let keys = KeyMaterial::import(&Config::new(vec![7u8; 16])).unwrap();
        let enc_a = keys.encryption_key(&[0u8; 12]).unwrap();
        let enc_b = keys.encryption_key(&[1u8; 12]).unwrap();
        assert_ne!(*enc_a, *enc_b);
        assert_ne!(*enc_a, *keys.signing_key().unwrap());

        // Same labels for both branches would collapse them; distinct labels must not.
        let empty_salt = keys.encryption_key(&[]).unwrap();
        assert_ne!(*empty_salt, *keys.signing_key().unwrap());
    }

    #[test]
    fn test_labels_change_keys() {
        let default = KeyMaterial::import(&Config::new(vec![7u8; 16])).unwrap();
        let namespaced =
            KeyMaterial::import(&Config::new(vec![7u8; 16]).namespace("order").unwrap()).unwrap();
        assert_ne!(*default.signing_key().unwrap(), *namespaced.signing_key().unwrap());
        assert_ne!(
            *default.encryption_key(&[0u8; 12]).unwrap(),
            *namespaced.encryption_key(&[0u8; 12]).unwrap()
        );
    }
}
