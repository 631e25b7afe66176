mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use common::TestApp;
use fieldops_api::auth::{Role, TenantContext};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn technician(app: &TestApp) -> (TenantContext, String) {
    let ctx = app.user("John", Role::Technician);
    let token = app.token_for(&ctx);
    (ctx, token)
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = TestApp::new().await;
    let (status, _, body) = send(&app.router(), get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["status"], "healthy");
}

#[tokio::test]
async fn api_requires_a_bearer_token() {
    let app = TestApp::new().await;
    let router = app.router();

    let (status, _, _) = send(&router, get("/api/v1/customers", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&router, get("/api/v1/customers", Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, token) = technician(&app);
    let (status, _, body) = send(&router, get("/api/v1/customers", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["total"], 0);
}

#[tokio::test]
async fn create_then_fetch_a_customer() {
    let app = TestApp::new().await;
    let router = app.router();
    let (ctx, token) = technician(&app);

    let (status, _, body) = send(
        &router,
        post_json(
            "/api/v1/customers",
            &token,
            json!({ "name": "Acme Dairy", "email": "ops@acme.test" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let created: Value = serde_json::from_slice(&body).unwrap();
    let id = created["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["data"]["company_id"], ctx.company_id.to_string());

    let (status, _, body) = send(
        &router,
        get(&format!("/api/v1/customers/{}", id), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(fetched["data"]["name"], "Acme Dairy");

    let (status, _, _) = send(
        &router,
        post_json("/api/v1/customers", &token, json!({ "name": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let app = TestApp::new().await;
    let (_, token) = technician(&app);

    let (status, _, body) = send(
        &app.router(),
        get(&format!("/api/v1/work-orders/{}", Uuid::new_v4()), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Not Found");
    assert!(json["message"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .uri("/status")
        .header("x-request-id", "req-abc-123")
        .body(Body::empty())
        .unwrap();

    let (status, headers, body) = send(&app.router(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-request-id"], "req-abc-123");
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["meta"]["request_id"], "req-abc-123");
}

#[tokio::test]
async fn service_report_renders_as_text() {
    let app = TestApp::new().await;
    let router = app.router();
    let (ctx, token) = technician(&app);
    let wo = app
        .work_order_with_notes(&ctx, "Pump overhaul", Some("Replaced the seal"))
        .await;

    let (status, headers, body) = send(
        &router,
        get(
            &format!("/api/v1/work-orders/{}/report?format=text", wo.id),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert!(String::from_utf8(body).unwrap().contains("Pump overhaul"));

    let (status, _, _) = send(
        &router,
        get(
            &format!("/api/v1/work-orders/{}/report?format=pdf", wo.id),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn escalating_a_call_over_http() {
    let app = TestApp::new().await;
    let router = app.router();
    let (_, token) = technician(&app);

    let (status, _, body) = send(
        &router,
        post_json(
            "/api/v1/call-logs",
            &token,
            json!({ "caller_name": "Mrs Patel", "summary": "No hot water" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let call: Value = serde_json::from_slice(&body).unwrap();
    let id = call["data"]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/v1/call-logs/{}/escalate", id);
    let (status, _, body) = send(&router, post_json(&uri, &token, json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let escalated: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(escalated["data"]["work_order"]["title"], "No hot water");

    let (status, _, _) = send(&router, post_json(&uri, &token, json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
