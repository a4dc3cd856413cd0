//! Keyed one-way password digests.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Computes HMAC-SHA256 digests of passwords under a process-wide secret.
///
/// Digest equality is the sole password-verification mechanism. There is no
/// per-record salt, so identical passwords yield identical digests across
/// users; stored digests are only as strong as the configured secret.
#[derive(Clone)]
pub struct PasswordHasher {
    secret: SecretString,
}

impl PasswordHasher {
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Hex digest of `password`, or `None` for an empty input.
    #[must_use]
    pub fn hash(&self, password: &str) -> Option<String> {
        if password.is_empty() {
            return None;
        }
        let mut mac =
            HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes()).ok()?;
        mac.update(password.as_bytes());
        Some(hex::encode(mac.finalize().into_bytes()))
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("secret", &"***")
            .finish()
    }
}
