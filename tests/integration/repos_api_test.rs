// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, create_test_app_with_github, wait_idle};
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_payload(user_id: Uuid, url: &str) -> Value {
    json!({
        "user_id": user_id,
        "url": url,
        "format": "zip",
        "schedule": { "kind": "daily" },
        "retention_count": 3
    })
}

#[tokio::test]
async fn test_create_and_get_repo() {
    let app = create_test_app().await;
    let user_id = Uuid::new_v4();

    let response = app
        .server
        .post("/v1/repos")
        .json(&create_payload(user_id, "https://github.com/acme/website.git"))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["name"], "website");
    assert_eq!(body["format"], "zip");
    assert_eq!(body["schedule"]["kind"], "daily");
    assert_eq!(body["has_token"], false);
    assert_eq!(body["is_active"], true);
    assert!(body["last_backup_at"].is_null());

    let id = body["id"].as_str().unwrap();
    let response = app.server.get(&format!("/v1/repos/{}", id)).await;
    response.assert_status_ok();
    let fetched: Value = response.json();
    assert_eq!(fetched["id"], body["id"]);

    let response = app
        .server
        .get("/v1/repos")
        .add_query_param("user_id", user_id.to_string())
        .await;
    response.assert_status_ok();
    let list: Vec<Value> = response.json();
    assert_eq!(list.len(), 1);
}

#[tokio::test]
async fn test_create_repo_rejects_invalid_payloads() {
    let app = create_test_app().await;
    let user_id = Uuid::new_v4();

    // Retention outside [1, 50]
    let mut payload = create_payload(user_id, "https://github.com/acme/website");
    payload["retention_count"] = json!(0);
    let response = app.server.post("/v1/repos").json(&payload).await;
    response.assert_status_bad_request();

    // Not a URL at all
    let payload = create_payload(user_id, "not a url");
    let response = app.server.post("/v1/repos").json(&payload).await;
    response.assert_status_bad_request();

    // Custom schedule missing its interval
    let mut payload = create_payload(user_id, "https://github.com/acme/website");
    payload["schedule"] = json!({ "kind": "custom", "interval_unit": "week" });
    let response = app.server.post("/v1/repos").json(&payload).await;
    response.assert_status_bad_request();

    // Unknown schedule kind
    let mut payload = create_payload(user_id, "https://github.com/acme/website");
    payload["schedule"] = json!({ "kind": "fortnightly" });
    let response = app.server.post("/v1/repos").json(&payload).await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_update_repo_changes_only_given_fields() {
    let app = create_test_app().await;
    let user_id = Uuid::new_v4();

    let response = app
        .server
        .post("/v1/repos")
        .json(&create_payload(user_id, "https://github.com/acme/website"))
        .await;
    let created: Value = response.json();
    let id = created["id"].as_str().unwrap();

    let response = app
        .server
        .put(&format!("/v1/repos/{}", id))
        .json(&json!({ "format": "targz", "retention_count": 7, "is_active": false }))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["format"], "targz");
    assert_eq!(updated["retention_count"], 7);
    assert_eq!(updated["is_active"], false);
    // schedule untouched
    assert_eq!(updated["schedule"]["kind"], "daily");
}

#[tokio::test]
async fn test_get_unknown_repo_returns_404() {
    let app = create_test_app().await;
    let response = app
        .server
        .get(&format!("/v1/repos/{}", Uuid::new_v4()))
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_trigger_backup_and_delete_repo_with_artifacts() {
    let app = create_test_app().await;
    let user_id = Uuid::new_v4();

    let response = app
        .server
        .post("/v1/repos")
        .json(&create_payload(user_id, "https://github.com/acme/website.git"))
        .await;
    let created: Value = response.json();
    let id: Uuid = created["id"].as_str().unwrap().parse().unwrap();

    let response = app
        .server
        .post(&format!("/v1/repos/{}/backup", id))
        .await;
    response.assert_status(axum::http::StatusCode::ACCEPTED);
    let job: Value = response.json();
    assert_eq!(job["status"], "running");

    wait_idle(&app, id).await;

    let repo_dir = app
        .backup_root
        .path()
        .join(format!("user_{}", user_id))
        .join("website");
    let artifacts: Vec<_> = std::fs::read_dir(&repo_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(artifacts.len(), 1);

    let response = app.server.delete(&format!("/v1/repos/{}", id)).await;
    response.assert_status(axum::http::StatusCode::NO_CONTENT);
    assert!(!repo_dir.exists());

    let response = app.server.get(&format!("/v1/repos/{}", id)).await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_trigger_unknown_repo_returns_404() {
    let app = create_test_app().await;
    let response = app
        .server
        .post(&format!("/v1/repos/{}/backup", Uuid::new_v4()))
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_verify_rejects_non_github_url() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/v1/repos/verify")
        .json(&json!({ "url": "https://gitlab.com/acme/website" }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_verify_against_mock_github() {
    let github = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/website"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "full_name": "acme/website" })),
        )
        .mount(&github)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/hidden"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&github)
        .await;

    let app = create_test_app_with_github(&github.uri()).await;

    let response = app
        .server
        .post("/v1/repos/verify")
        .json(&json!({ "url": "https://github.com/acme/website.git" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["accessible"], true);
    assert_eq!(body["full_name"], "acme/website");

    let response = app
        .server
        .post("/v1/repos/verify")
        .json(&json!({ "url": "https://github.com/acme/hidden" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["accessible"], false);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_health_reports_scheduler_liveness() {
    let app = create_test_app().await;

    let response = app.server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["scheduler_alive"], false);

    app.scheduler_status.beat();
    let response = app.server.get("/health").await;
    let body: Value = response.json();
    assert_eq!(body["scheduler_alive"], true);
}

#[tokio::test]
async fn test_version_endpoint() {
    let app = create_test_app().await;
    let response = app.server.get("/v1/version").await;
    response.assert_status_ok();
    assert_eq!(response.text(), env!("CARGO_PKG_VERSION"));
}
