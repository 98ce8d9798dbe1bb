//! One-way password storage.
//!
//! [`Password`] only ever holds the Argon2 PHC string derived from a
//! plaintext. Plaintext passes through [`Password::set`] and
//! [`Password::matches`] and is never retained, logged, or serialized.

use std::fmt;

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::error::{StoreError, StoreResult};

const SALT_LEN: usize = 16;

/// A derived password hash.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Password {
    hash: Option<String>,
}

impl Password {
    /// Derives a hash from `plaintext` with a fresh random salt.
    pub fn set(plaintext: &str) -> StoreResult<Self> {
        let mut salt_bytes = [0u8; SALT_LEN];
        getrandom::getrandom(&mut salt_bytes)
            .map_err(|e| StoreError::unknown(format!("failed to generate salt: {}", e)))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| StoreError::unknown(format!("failed to encode salt: {}", e)))?;

        let hash = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| StoreError::unknown(format!("failed to derive password hash: {}", e)))?
            .to_string();

        Ok(Self { hash: Some(hash) })
    }

    /// Wraps an already derived PHC string, e.g. one read back from storage.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self {
            hash: Some(hash.into()),
        }
    }

    /// The PHC string, if a hash has been set.
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    /// Returns true once a hash has been derived or loaded.
    pub fn is_set(&self) -> bool {
        self.hash.is_some()
    }

    /// Verifies `plaintext` against the stored hash.
    ///
    /// The digest comparison is constant-time. An unset or malformed hash
    /// never matches.
    pub fn matches(&self, plaintext: &str) -> bool {
        let Some(hash) = self.hash.as_deref() else {
            return false;
        };
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash is malformed");
                false
            }
        }
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_set() { "<redacted>" } else { "<unset>" };
        f.debug_tuple("Password").field(&format_args!("{}", state)).finish()
    }
}
