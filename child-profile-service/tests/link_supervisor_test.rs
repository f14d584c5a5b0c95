mod common;

use child_profile_service::config::JwtConfig;
use child_profile_service::services::JwtService;
use common::{TestApp, TEST_JWT_SECRET, TEST_TEACHER_ID};
use reqwest::Client;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn teacher_can_link_with_valid_code() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let code = app
        .jwt
        .generate_linking_code("child-9")
        .expect("Failed to generate linking code");

    Mock::given(method("PUT"))
        .and(path("/internal/children/child-9/link-supervisor"))
        .and(body_json(json!({ "supervisor_id": TEST_TEACHER_ID })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "linked" })))
        .expect(1)
        .mount(&app.db_interact)
        .await;

    let response = client
        .post(format!("{}/profiles/children/link-supervisor", app.address))
        .bearer_auth(app.teacher_token())
        .json(&json!({ "linking_code": code }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["child_id"], "child-9");
}

#[tokio::test]
async fn parent_cannot_link_supervisor() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let code = app
        .jwt
        .generate_linking_code("child-9")
        .expect("Failed to generate linking code");

    let response = client
        .post(format!("{}/profiles/children/link-supervisor", app.address))
        .bearer_auth(app.parent_token())
        .json(&json!({ "linking_code": code }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn garbage_linking_code_is_rejected() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/profiles/children/link-supervisor", app.address))
        .bearer_auth(app.teacher_token())
        .json(&json!({ "linking_code": "not-a-code" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn body_without_linking_code_is_a_bad_request() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/profiles/children/link-supervisor", app.address))
        .bearer_auth(app.teacher_token())
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    let error = body["error"].as_str().unwrap_or_default();
    assert!(error.contains("linking_code"), "got: {}", error);
}

#[tokio::test]
async fn empty_linking_code_is_rejected() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/profiles/children/link-supervisor", app.address))
        .bearer_auth(app.teacher_token())
        .json(&json!({ "linking_code": "" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn expired_linking_code_is_rejected() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    // Same secret, but codes expire immediately.
    let expired_issuer = JwtService::new(&JwtConfig {
        secret: TEST_JWT_SECRET.to_string(),
        linking_code_expiry_hours: -1,
    });
    let code = expired_issuer
        .generate_linking_code("child-9")
        .expect("Failed to generate linking code");

    let response = client
        .post(format!("{}/profiles/children/link-supervisor", app.address))
        .bearer_auth(app.teacher_token())
        .json(&json!({ "linking_code": code }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn downstream_child_not_found_is_relayed() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let code = app
        .jwt
        .generate_linking_code("child-gone")
        .expect("Failed to generate linking code");

    Mock::given(method("PUT"))
        .and(path("/internal/children/child-gone/link-supervisor"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "not found" })))
        .expect(1)
        .mount(&app.db_interact)
        .await;

    let response = client
        .post(format!("{}/profiles/children/link-supervisor", app.address))
        .bearer_auth(app.teacher_token())
        .json(&json!({ "linking_code": code }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);
}
