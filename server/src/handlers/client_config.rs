use actix_web::{get, web, HttpResponse};

use crate::{config::ClientConfig, error::Result};

#[get("/firebase-config")]
pub async fn firebase_config(client: web::Data<ClientConfig>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(client.get_ref()))
}
