#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use studyhub_server::auth::{AuthError, CallerIdentity, StaticVerifier};
use studyhub_server::config::ClientConfig;
use studyhub_server::db::{MemoryUserStore, UserDocument, UserStore};
use studyhub_server::error::{ApiError, Result};

pub const ALICE_TOKEN: &str = "token-alice";
pub const BOB_TOKEN: &str = "token-bob";
pub const EXPIRED_TOKEN: &str = "token-expired";
pub const OUTAGE_TOKEN: &str = "token-outage";
pub const BLANK_UID_TOKEN: &str = "token-blank-uid";

pub fn alice() -> CallerIdentity {
    CallerIdentity::new(
        "uid-alice".to_string(),
        Some("alice@example.com".to_string()),
        None,
    )
}

pub fn bob() -> CallerIdentity {
    CallerIdentity::new(
        "uid-bob".to_string(),
        Some("bob@example.com".to_string()),
        Some("Bob Builder".to_string()),
    )
}

pub fn verifier() -> StaticVerifier {
    StaticVerifier::new()
        .with_identity(ALICE_TOKEN, alice())
        .with_identity(BOB_TOKEN, bob())
        .with_identity(
            BLANK_UID_TOKEN,
            CallerIdentity::new(String::new(), Some("ghost@example.com".to_string()), None),
        )
        .with_rejection(EXPIRED_TOKEN, AuthError::Expired)
        .with_rejection(
            OUTAGE_TOKEN,
            AuthError::ProviderUnavailable("connection reset".to_string()),
        )
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// Memory store that counts every call made through the trait.
#[derive(Clone, Default)]
pub struct CountingStore {
    pub inner: MemoryUserStore,
    calls: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStore for CountingStore {
    async fn get_document(&self, uid: &str) -> Result<Option<UserDocument>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_document(uid).await
    }

    async fn merge_document(&self, uid: &str, partial: UserDocument) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.merge_document(uid, partial).await
    }

    async fn init_document(
        &self,
        uid: &str,
        identity: UserDocument,
        seed: UserDocument,
    ) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.init_document(uid, identity, seed).await
    }
}

/// Store whose backend is permanently down.
pub struct UnavailableStore;

#[async_trait]
impl UserStore for UnavailableStore {
    async fn get_document(&self, _uid: &str) -> Result<Option<UserDocument>> {
        Err(ApiError::StoreUnavailable("connection refused (10.1.2.3:27017)".to_string()))
    }

    async fn merge_document(&self, _uid: &str, _partial: UserDocument) -> Result<()> {
        Err(ApiError::StoreUnavailable("connection refused (10.1.2.3:27017)".to_string()))
    }

    async fn init_document(
        &self,
        _uid: &str,
        _identity: UserDocument,
        _seed: UserDocument,
    ) -> Result<()> {
        Err(ApiError::StoreUnavailable("connection refused (10.1.2.3:27017)".to_string()))
    }
}

pub fn client_config() -> ClientConfig {
    ClientConfig {
        api_key: "test-api-key".to_string(),
        project_id: "studyhub-test".to_string(),
        ..ClientConfig::default()
    }
}

/// Builds the full application around the given store.
macro_rules! init_app {
    ($store:expr) => {{
        let store: std::sync::Arc<dyn studyhub_server::db::UserStore> = $store;
        let verifier: std::sync::Arc<dyn studyhub_server::auth::IdentityVerifier> =
            std::sync::Arc::new($crate::common::verifier());
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::from(verifier))
                .app_data(actix_web::web::Data::from(store))
                .app_data(actix_web::web::Data::new($crate::common::client_config()))
                .configure(studyhub_server::routes::configure),
        )
        .await
    }};
}
