pub mod memory;
pub mod models;
pub mod repository;

use async_trait::async_trait;

use crate::error::Result;

pub use memory::MemoryUserStore;
pub use models::UserDocument;
pub use repository::{MongoDbContext, MongoUserStore};

/// Per-user document persistence. One document per `uid`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// `None` means the user has no document yet.
    async fn get_document(&self, uid: &str) -> Result<Option<UserDocument>>;

    /// Shallow merge: top-level fields in `partial` overwrite, the rest are kept.
    /// Creates the document when it does not exist.
    async fn merge_document(&self, uid: &str, partial: UserDocument) -> Result<()>;

    /// Merges `identity` unconditionally and writes `seed` only when the
    /// document is created. Identity wins where both name a field.
    async fn init_document(
        &self,
        uid: &str,
        identity: UserDocument,
        seed: UserDocument,
    ) -> Result<()>;
}
