use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    auth::CallerIdentity,
    db::{
        models::{self, DEFAULT_USERNAME},
        UserStore,
    },
    error::{ApiError, Result},
};

#[get("/user/data")]
pub async fn get_user_data(
    store: web::Data<dyn UserStore>,
    identity: web::ReqData<CallerIdentity>,
) -> Result<HttpResponse> {
    let stored = store.get_document(&identity.uid).await?;
    if stored.is_none() {
        log::debug!("No document for {}, returning defaults", identity.uid);
    }

    Ok(HttpResponse::Ok().json(models::with_defaults(stored)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub success: bool,
    pub updated_keys: Vec<String>,
}

#[post("/user/data")]
pub async fn save_user_data(
    store: web::Data<dyn UserStore>,
    identity: web::ReqData<CallerIdentity>,
    body: web::Json<Value>,
) -> Result<HttpResponse> {
    let partial = models::client_update(body.into_inner())?;
    let updated_keys: Vec<String> = partial.keys().cloned().collect();

    store.merge_document(&identity.uid, partial).await?;

    log::info!(
        "Saved {} field(s) for {}",
        updated_keys.len(),
        identity.uid
    );

    Ok(HttpResponse::Ok().json(SaveResponse {
        success: true,
        updated_keys,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct InitRequest {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InitResponse {
    pub success: bool,
    pub uid: String,
}

/// The body is optional; when present it must be a valid `InitRequest`.
fn parse_init_request(body: &[u8]) -> Result<InitRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(InitRequest::default());
    }
    serde_json::from_slice(body).map_err(|err| ApiError::InvalidBody(err.to_string()))
}

/// Creates the caller's document, or refreshes its identity fields if it exists.
/// The uid always comes from the verified token, never from the body.
#[post("/user/init")]
pub async fn init_user(
    store: web::Data<dyn UserStore>,
    identity: web::ReqData<CallerIdentity>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let identity = identity.into_inner();
    if identity.uid.trim().is_empty() {
        return Err(ApiError::MissingRequiredField("uid"));
    }

    let request = parse_init_request(&body)?;
    if let Some(body_uid) = request.uid.as_deref() {
        if body_uid != identity.uid {
            log::warn!(
                "Ignoring uid in init body; initializing token identity {}",
                identity.uid
            );
        }
    }

    let username = request
        .username
        .filter(|name| !name.trim().is_empty())
        .or_else(|| identity.name.clone())
        .unwrap_or_else(|| DEFAULT_USERNAME.to_string());

    store
        .init_document(
            &identity.uid,
            models::identity_fields(&identity),
            models::seed_fields(&username, Utc::now()),
        )
        .await?;

    Ok(HttpResponse::Ok().json(InitResponse {
        success: true,
        uid: identity.uid,
    }))
}

#[derive(Debug, Deserialize)]
pub struct BackupRequest {
    #[serde(rename = "appData", default)]
    pub app_data: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupResponse {
    pub status: &'static str,
    pub received_keys: Vec<String>,
}

/// Legacy client backup: the `appData` object is merged like a save.
#[post("/backup-data")]
pub async fn backup_data(
    store: web::Data<dyn UserStore>,
    identity: web::ReqData<CallerIdentity>,
    body: web::Json<BackupRequest>,
) -> Result<HttpResponse> {
    let app_data = match body.into_inner().app_data {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };

    let partial = models::client_update(app_data)?;
    let received_keys: Vec<String> = partial.keys().cloned().collect();

    store.merge_document(&identity.uid, partial).await?;

    Ok(HttpResponse::Ok().json(BackupResponse {
        status: "ok",
        received_keys,
    }))
}
