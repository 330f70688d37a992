//! API key pair used to sign requests.

use secrecy::{ExposeSecret, Secret};
use std::fmt;

/// Access key and secret key for one API family.
///
/// The secret is wrapped in [`Secret`] and redacted from `Debug` output.
pub struct Credentials {
    access_key: String,
    secret_key: Secret<String>,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: Secret::new(secret_key.into()),
        }
    }

    /// The public access key, sent in request headers.
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// The secret key. Only for computing signatures.
    pub(crate) fn secret_key(&self) -> &str {
        self.secret_key.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}
