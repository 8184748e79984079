use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::Arc;

use super::{models::UserDocument, UserStore};
use crate::error::Result;

#[derive(Clone, Default)]
pub struct MemoryUserStore {
    // uid -> document
    documents: Arc<DashMap<String, UserDocument>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_document(&self, uid: &str) -> Result<Option<UserDocument>> {
        Ok(self.documents.get(uid).map(|entry| entry.value().clone()))
    }

    async fn merge_document(&self, uid: &str, partial: UserDocument) -> Result<()> {
        if partial.is_empty() {
            return Ok(());
        }

        self.documents
            .entry(uid.to_string())
            .or_default()
            .extend(partial);
        Ok(())
    }

    async fn init_document(
        &self,
        uid: &str,
        identity: UserDocument,
        seed: UserDocument,
    ) -> Result<()> {
        match self.documents.entry(uid.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().extend(identity);
            }
            Entry::Vacant(entry) => {
                let mut document = seed;
                document.extend(identity);
                entry.insert(document);
                log::info!("Created user document for {}", uid);
            }
        }
        Ok(())
    }
}
