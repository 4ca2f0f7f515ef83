use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use thiserror::Error;
use zeroize::Zeroizing;

static GLOBAL_CONFIG: Lazy<Mutex<Option<Config>>> = Lazy::new(|| Mutex::new(None));

// Bumped on every `set_global` so cached facades built from an older config are dropped.
static GLOBAL_GENERATION: AtomicU64 = AtomicU64::new(0);

pub(crate) const DEFAULT_SIGN_LABEL: &str = "safeid#sign";
pub(crate) const DEFAULT_ENCRYPT_LABEL: &str = "safeid#encrypt";

/// Configuring the safeid library.
///
/// Holds the root secret and the two HKDF context labels separating the signing
/// branch from the encryption branch. The secret is zeroed when the last copy
/// is dropped.
#[derive(Clone)]
pub struct Config {
    pub(crate) key: Zeroizing<Vec<u8>>,
    pub(crate) sign_label: String,
    pub(crate) encrypt_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("HKDF labels must be non-empty and distinct")]
    InvalidLabel,
    #[error("Namespace must be non-empty")]
    InvalidNamespace,
}

impl Config {
    /// Creates a new configuration with the given root `key` and the default labels
    /// `safeid#sign` and `safeid#encrypt`.
    ///
    /// The key is only ever used as HKDF input key material. It should be a secure
    /// random value; an empty key is rejected when the [`SafeId`](crate::SafeId) is built.
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Config {
            key: Zeroizing::new(key.into()),
            sign_label: DEFAULT_SIGN_LABEL.to_string(),
            encrypt_label: DEFAULT_ENCRYPT_LABEL.to_string(),
        }
    }

    /// Prefixes both labels with `name/`, giving an independent key space for one
    /// family of identifiers under the same root key.
    pub fn namespace(mut self, name: &str) -> Result<Self, ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::InvalidNamespace);
        }
        self.sign_label = format!("{}/{}", name, self.sign_label);
        self.encrypt_label = format!("{}/{}", name, self.encrypt_label);
        Ok(self)
    }

    /// Sets the HKDF context labels explicitly.
    /// Both must be non-empty and they must differ.
    pub fn labels(mut self, sign: &str, encrypt: &str) -> Result<Self, ConfigError> {
        if sign.is_empty() || encrypt.is_empty() || sign == encrypt {
            Err(ConfigError::InvalidLabel)
        } else {
            self.sign_label = sign.to_string();
            self.encrypt_label = encrypt.to_string();
            Ok(self)
        }
    }

    /// Sets the global configuration. This should be called before the `Field` type methods
    /// are called. The core [`SafeId`](crate::SafeId) never reads it.
    pub fn set_global(config: Config) {
        let mut global_config = GLOBAL_CONFIG.lock().unwrap_or_else(PoisonError::into_inner);
        *global_config = Some(config);
        GLOBAL_GENERATION.fetch_add(1, Ordering::AcqRel);
    }

    /// Accesses the global configuration, if set.
    pub fn global() -> Option<Config> {
        GLOBAL_CONFIG
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn global_generation() -> u64 {
        GLOBAL_GENERATION.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Config")
            .field("key", &"<redacted>")
            .field("sign_label", &self.sign_label)
            .field("encrypt_label", &self.encrypt_label)
            .finish()
    }
}
