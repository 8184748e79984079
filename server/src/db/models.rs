use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use crate::auth::CallerIdentity;
use crate::error::{ApiError, Result};

/// A user's stored JSON document. Fields are recognized, not enforced.
pub type UserDocument = Map<String, Value>;

pub const DEFAULT_USERNAME: &str = "User";
pub const DEFAULT_THEME: &str = "light";

/// Written by `init` only; dropped from client updates.
pub const SERVER_OWNED_FIELDS: [&str; 2] = ["uid", "createdAt"];

const RESERVED_FIELDS: [&str; 1] = ["_id"];

/// The shape returned to callers that have no stored document yet.
pub fn default_document() -> UserDocument {
    let mut document = Map::new();
    document.insert("todos".to_string(), json!([]));
    document.insert("timeSessions".to_string(), json!([]));
    document.insert("routine".to_string(), json!([]));
    document.insert("username".to_string(), json!(DEFAULT_USERNAME));
    document.insert("theme".to_string(), json!(DEFAULT_THEME));
    document
}

/// Stored fields laid over the default shape.
pub fn with_defaults(stored: Option<UserDocument>) -> UserDocument {
    let mut document = default_document();
    if let Some(stored) = stored {
        document.extend(stored);
    }
    document
}

pub fn string_field<'a>(document: &'a UserDocument, field: &str) -> Option<&'a str> {
    document.get(field).and_then(Value::as_str)
}

/// Top-level keys must be plain names so the store merges them shallowly.
pub fn validate_fields(document: &UserDocument) -> Result<()> {
    for key in document.keys() {
        if key.is_empty()
            || key.starts_with('$')
            || key.contains('.')
            || RESERVED_FIELDS.contains(&key.as_str())
        {
            return Err(ApiError::InvalidField(key.clone()));
        }
    }
    Ok(())
}

/// Converts a client payload into a partial document safe to merge.
pub fn client_update(body: Value) -> Result<UserDocument> {
    let Value::Object(mut partial) = body else {
        return Err(ApiError::InvalidBody(
            "expected a JSON object".to_string(),
        ));
    };

    for field in SERVER_OWNED_FIELDS {
        if partial.remove(field).is_some() {
            log::debug!("Ignoring server-owned field '{}' in client update", field);
        }
    }

    validate_fields(&partial)?;
    Ok(partial)
}

/// Fields refreshed on every `init` call.
pub fn identity_fields(identity: &CallerIdentity) -> UserDocument {
    let mut document = Map::new();
    document.insert("uid".to_string(), json!(identity.uid));
    if let Some(email) = &identity.email {
        document.insert("email".to_string(), json!(email));
    }
    document
}

/// Fields written only when the document is first created.
pub fn seed_fields(username: &str, created_at: DateTime<Utc>) -> UserDocument {
    let mut document = default_document();
    document.insert("username".to_string(), json!(username));
    document.insert("studyTime".to_string(), json!(0));
    document.insert("dailyStats".to_string(), json!({}));
    document.insert(
        "createdAt".to_string(),
        json!(created_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    document
}
