use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{ServiceRequest, ServiceResponse},
    http::header,
    middleware::Next,
    web, HttpMessage, ResponseError,
};

use crate::auth::{authenticate, IdentityVerifier};
use crate::error::ApiError;

/// Rejects the request with 401 unless it carries a verifiable bearer token.
/// On success the `CallerIdentity` is stored in the request extensions.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<EitherBody<impl MessageBody>>, actix_web::Error> {
    let verifier = req
        .app_data::<web::Data<dyn IdentityVerifier>>()
        .cloned()
        .ok_or_else(|| ApiError::Internal("Identity verifier not available".to_string()))?;

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let identity = match authenticate(verifier.get_ref(), header_value).await {
        Ok(identity) => identity,
        Err(err) => {
            log::warn!("Rejected {} {}: {}", req.method(), req.path(), err);
            let response = err.error_response();
            return Ok(req.into_response(response).map_into_right_body());
        }
    };

    log::debug!("Authenticated {} for {}", identity.uid, req.path());
    req.extensions_mut().insert(identity);

    next.call(req)
        .await
        .map(ServiceResponse::map_into_left_body)
}
