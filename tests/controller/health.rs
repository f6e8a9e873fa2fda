use axum::http::{header, Request, StatusCode};
use sclh::server::router;
use tower::ServiceExt;

use super::*;

/// Expect 200 OK with `{"alive":true}` and no upstream calls
#[tokio::test]
async fn health_reports_alive() {
    let test = TestSetup::new().await;
    let app = router::routes().with_state(test.app_state(&test.config()));

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, serde_json::json!({ "alive": true }));
}

/// Expect the browser hardening headers on every response
#[tokio::test]
async fn responses_carry_security_headers() {
    let test = TestSetup::new().await;
    let app = router::routes().with_state(test.app_state(&test.config()));

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
    assert_eq!(
        headers[header::REFERRER_POLICY],
        "strict-origin-when-cross-origin"
    );
    assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));
}

/// Expect the OpenAPI document to list both endpoints
#[tokio::test]
async fn openapi_document_lists_endpoints() {
    let test = TestSetup::new().await;
    let app = router::routes().with_state(test.app_state(&test.config()));

    let response = app
        .oneshot(
            Request::get("/api/docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let document: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(document["paths"]["/info"]["post"].is_object());
    assert!(document["paths"]["/health"]["get"].is_object());
}
