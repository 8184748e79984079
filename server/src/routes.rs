use actix_cors::Cors;
use actix_web::{http::header, middleware::from_fn, web};

use crate::{error::ApiError, handlers, middleware::auth_middleware};

/// Registers every route. The caller provides `Data<dyn IdentityVerifier>`,
/// `Data<dyn UserStore>` and `Data<ClientConfig>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        // Public routes (no authentication required)
        .service(handlers::health_check)
        .service(handlers::firebase_config)
        // Protected routes (authentication required)
        .service(
            web::scope("/api")
                .wrap(from_fn(auth_middleware))
                .service(handlers::get_profile)
                .service(handlers::get_user_data)
                .service(handlers::save_user_data)
                .service(handlers::init_user)
                .service(handlers::backup_data),
        )
        .default_service(web::to(handlers::not_found));
}

/// Malformed or non-JSON bodies get the same error envelope as everything else.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::InvalidBody(err.to_string()).into())
}

/// `None` allows any origin.
pub fn cors_policy(frontend_origin: Option<&str>) -> Cors {
    let cors = match frontend_origin {
        Some(origin) => Cors::default().allowed_origin(origin),
        None => Cors::default().allow_any_origin(),
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(3600)
}
