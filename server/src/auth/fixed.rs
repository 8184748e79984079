use std::collections::HashMap;

use async_trait::async_trait;

use super::{AuthError, CallerIdentity, IdentityVerifier};

/// Verifier backed by a fixed token table, for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticVerifier {
    tokens: HashMap<String, std::result::Result<CallerIdentity, AuthError>>,
}

impl StaticVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, token: &str, identity: CallerIdentity) -> Self {
        self.tokens.insert(token.to_string(), Ok(identity));
        self
    }

    pub fn with_rejection(mut self, token: &str, error: AuthError) -> Self {
        self.tokens.insert(token.to_string(), Err(error));
        self
    }
}

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify_token(&self, token: &str) -> Result<CallerIdentity, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .unwrap_or(Err(AuthError::Invalid))
    }
}
