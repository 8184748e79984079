use async_trait::async_trait;
use mongodb::{
    bson::{self, doc, Bson, Document},
    Client, Collection, Database,
};
use serde_json::Value;

use super::{models::UserDocument, UserStore};
use crate::error::{ApiError, Result};

pub const USERS_COLLECTION: &str = "users";

#[derive(Clone)]
pub struct MongoDbContext {
    db: Database,
}

impl MongoDbContext {
    pub fn new(client: Client, database_name: &str) -> Self {
        Self {
            db: client.database(database_name),
        }
    }

    pub fn users(&self) -> MongoUserStore {
        MongoUserStore {
            collection: self.db.collection(USERS_COLLECTION),
        }
    }

    /// Fails when the server cannot be reached.
    pub async fn ping(&self) -> Result<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        log::info!("Document store reachable (database: {})", self.db.name());
        Ok(())
    }
}

/// User documents keyed by `_id = uid`.
#[derive(Clone)]
pub struct MongoUserStore {
    collection: Collection<Document>,
}

fn to_bson_document(fields: &UserDocument) -> Result<Document> {
    bson::to_document(fields).map_err(|e| ApiError::InvalidBody(e.to_string()))
}

fn to_user_document(mut stored: Document) -> UserDocument {
    stored.remove("_id");
    match Bson::Document(stored).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => UserDocument::new(),
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn get_document(&self, uid: &str) -> Result<Option<UserDocument>> {
        let stored = self.collection.find_one(doc! { "_id": uid }).await?;
        Ok(stored.map(to_user_document))
    }

    async fn merge_document(&self, uid: &str, partial: UserDocument) -> Result<()> {
        if partial.is_empty() {
            return Ok(());
        }

        let fields = to_bson_document(&partial)?;
        self.collection
            .update_one(doc! { "_id": uid }, doc! { "$set": fields })
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn init_document(
        &self,
        uid: &str,
        identity: UserDocument,
        mut seed: UserDocument,
    ) -> Result<()> {
        // A field may not appear under both operators.
        seed.retain(|key, _| !identity.contains_key(key));

        let mut update = doc! { "$set": to_bson_document(&identity)? };
        if !seed.is_empty() {
            update.insert("$setOnInsert", to_bson_document(&seed)?);
        }

        let result = self
            .collection
            .update_one(doc! { "_id": uid }, update)
            .upsert(true)
            .await?;

        if result.upserted_id.is_some() {
            log::info!("Created user document for {}", uid);
        }
        Ok(())
    }
}
