//! Platform API collaborators.
//!
//! The migration engine only talks to the platform through [`PlatformApi`].
//! [`QualysClient`] is the production implementation; tests script their own.

mod credentials;
mod qualys;


use thiserror::Error;

use crate::migration::{AssetRecord, KeyRecord};

pub use credentials::{CredentialProvider, Credentials, Secret, StaticCredentials};
pub use qualys::{ClientOptions, QualysClient};

/// Authenticated, read-only view of one platform account.
///
/// Both operations page internally and only return once the listing is
/// exhausted. Any failure aborts the run; callers never retry.
pub trait PlatformApi {
    /// Every activation key visible to the authenticated user, in listing order.
    fn fetch_all_activation_keys(&self) -> Result<Vec<KeyRecord>, TransportError>;

    /// Every asset whose agent was installed with `key_id`.
    fn fetch_assets_by_key(&self, key_id: &str) -> Result<Vec<AssetRecord>, TransportError>;
}

/// Failure reported by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The request went through but the platform answered with an error code.
    #[error("{url} reported {code}: {message}")]
    Platform {
        url: String,
        code: String,
        message: String,
    },

    #[error("unexpected response from {url}: {message}")]
    InvalidResponse { url: String, message: String },
}
