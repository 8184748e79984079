#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use std::sync::Arc;

use common::UnavailableStore;

#[actix_web::test]
async fn test_health_check() {
    let app = init_app!(Arc::new(studyhub_server::db::MemoryUserStore::new()));

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, serde_json::json!({"status": "ok"}));
}

#[actix_web::test]
async fn test_health_check_ignores_store_outage() {
    let app = init_app!(Arc::new(UnavailableStore));

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn test_unknown_route_is_json_404() {
    let app = init_app!(Arc::new(studyhub_server::db::MemoryUserStore::new()));

    let req = test::TestRequest::get().uri("/does-not-exist").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Not found");
}
