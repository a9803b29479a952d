//! Credential verification for the `Authenticate` command.

use std::fmt;
use std::sync::{PoisonError, RwLock};

use sha2::{Digest, Sha256};

use cuebridge_config::Config;

/// Decides whether an offered credential unlocks a connection.
pub trait Authenticator: Send + Sync {
    /// Returns `true` when `offered` is acceptable.
    fn verify(&self, offered: &str) -> bool;
}

/// Accepts exactly one shared secret.
///
/// Only the SHA-256 digest of the secret is retained. With no secret
/// configured every credential is rejected. The secret can be replaced
/// while connections are being served; connections that already
/// authenticated stay authenticated.
#[derive(Default)]
pub struct SharedSecretAuthenticator {
    digest: RwLock<Option<[u8; 32]>>,
}

impl SharedSecretAuthenticator {
    /// Creates an authenticator for `secret`.
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            digest: RwLock::new(secret.map(digest)),
        }
    }

    /// Creates an authenticator from the configured `auth_secret`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.auth_secret())
    }

    /// Swaps in a new secret; `None` locks everyone out.
    pub fn replace_secret(&self, secret: Option<&str>) {
        *self.digest.write().unwrap_or_else(PoisonError::into_inner) = secret.map(digest);
    }

    fn is_configured(&self) -> bool {
        self.digest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Authenticator for SharedSecretAuthenticator {
    fn verify(&self, offered: &str) -> bool {
        let Some(expected) = *self.digest.read().unwrap_or_else(PoisonError::into_inner) else {
            return false;
        };
        let offered = digest(offered);
        expected
            .iter()
            .zip(offered.iter())
            .fold(0_u8, |acc, (left, right)| acc | (left ^ right))
            == 0
    }
}

impl fmt::Debug for SharedSecretAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecretAuthenticator")
            .field("configured", &self.is_configured())
            .finish()
    }
}

fn digest(secret: &str) -> [u8; 32] {
    Sha256::digest(secret.as_bytes()).into()
}
