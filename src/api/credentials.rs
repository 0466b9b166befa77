//! Account credentials and the provider seam used to obtain them.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use zeroize::Zeroizing;

use crate::error::Result;

/// A string whose memory is cleared on drop and which never prints itself.
#[derive(Clone, Default)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    pub fn new(value: String) -> Self {
        Self(Zeroizing::new(value))
    }

    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

/// Username and password for one subscription.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Secret,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<Secret>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Value for an HTTP `Authorization` header using basic auth.
    pub fn basic_auth_header(&self) -> Secret {
        let raw = Zeroizing::new(format!(
            "{}:{}",
            self.username,
            self.password.expose_secret()
        ));
        Secret::new(format!("Basic {}", STANDARD.encode(raw.as_bytes())))
    }
}

/// Supplies credentials when an API client is constructed.
///
/// Keeps interactive prompting out of the migration engine: the CLI injects a
/// provider that may prompt, tests inject [`StaticCredentials`].
pub trait CredentialProvider {
    fn credentials(&mut self) -> Result<Credentials>;
}

/// Provider that hands out credentials known up front.
#[derive(Debug, Clone)]
pub struct StaticCredentials(pub Credentials);

impl CredentialProvider for StaticCredentials {
    fn credentials(&mut self) -> Result<Credentials> {
        Ok(self.0.clone())
    }
}
