pub mod client_config;
pub mod health;
pub mod profile;
pub mod user_data;

use actix_web::HttpResponse;

use crate::error::{ApiError, Result};

pub use client_config::firebase_config;
pub use health::health_check;
pub use profile::get_profile;
pub use user_data::{backup_data, get_user_data, init_user, save_user_data};

pub async fn not_found() -> Result<HttpResponse> {
    Err(ApiError::NotFound)
}
