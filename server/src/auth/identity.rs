use crate::error::{ApiError, Result};

use super::IdentityVerifier;

const BEARER_PREFIX: &str = "Bearer ";

/// The verified caller of a request. Built fresh from every token, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl CallerIdentity {
    /// Falls back to the email local part when the provider has no display name.
    pub fn new(uid: String, email: Option<String>, name: Option<String>) -> Self {
        let name = name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| email.as_deref().and_then(name_from_email));

        Self { uid, email, name }
    }
}

fn name_from_email(email: &str) -> Option<String> {
    let local = email.split('@').next()?.trim();
    if local.is_empty() {
        None
    } else {
        Some(local.to_string())
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn parse_bearer(header: &str) -> Result<&str> {
    let token = header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .ok_or(ApiError::MissingOrMalformedAuthHeader)?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(ApiError::MissingOrMalformedAuthHeader);
    }

    Ok(token)
}

/// Verifies the raw `Authorization` header value of a request.
pub async fn authenticate(
    verifier: &dyn IdentityVerifier,
    header: Option<&str>,
) -> Result<CallerIdentity> {
    let header = header.ok_or(ApiError::MissingOrMalformedAuthHeader)?;
    let token = parse_bearer(header)?;
    let identity = verifier.verify_token(token).await?;
    Ok(identity)
}
