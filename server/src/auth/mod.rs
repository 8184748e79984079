pub mod firebase;
pub mod identity;
pub mod fixed;

use async_trait::async_trait;

pub use firebase::{decode_claims, FirebaseVerifier, IdTokenClaims};
pub use fixed::StaticVerifier;
pub use identity::{authenticate, parse_bearer, CallerIdentity};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Malformed auth token")]
    Malformed,

    #[error("Auth token expired")]
    Expired,

    #[error("Invalid auth token")]
    Invalid,

    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),
}

/// Turns a bearer token into a verified caller identity.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<CallerIdentity, AuthError>;
}
