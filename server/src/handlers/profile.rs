use actix_web::{get, web, HttpResponse};
use serde::Serialize;

use crate::{
    auth::CallerIdentity,
    db::{
        models::{string_field, DEFAULT_THEME, DEFAULT_USERNAME},
        UserStore,
    },
    error::Result,
};

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub uid: String,
    pub email: Option<String>,
    pub username: String,
    pub theme: String,
}

#[get("/profile")]
pub async fn get_profile(
    store: web::Data<dyn UserStore>,
    identity: web::ReqData<CallerIdentity>,
) -> Result<HttpResponse> {
    let identity = identity.into_inner();
    let document = store.get_document(&identity.uid).await?;

    let (username, theme) = match &document {
        Some(document) => (
            string_field(document, "username").unwrap_or(DEFAULT_USERNAME),
            string_field(document, "theme").unwrap_or(DEFAULT_THEME),
        ),
        None => (DEFAULT_USERNAME, DEFAULT_THEME),
    };

    let response = ProfileResponse {
        username: username.to_string(),
        theme: theme.to_string(),
        uid: identity.uid,
        email: identity.email,
    };

    Ok(HttpResponse::Ok().json(response))
}
