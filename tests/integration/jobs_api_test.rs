// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, wait_idle};
use serde_json::{json, Value};
use uuid::Uuid;

async fn register_repo(app: &super::helpers::TestApp, url: &str) -> Uuid {
    let response = app
        .server
        .post("/v1/repos")
        .json(&json!({
            "user_id": Uuid::new_v4(),
            "url": url,
            "schedule": { "kind": "manual" },
            "retention_count": 2
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = response.json();
    body["id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_job_history_records_completed_run() {
    let app = create_test_app().await;
    let repo_id = register_repo(&app, "https://github.com/acme/website.git").await;

    let response = app
        .server
        .post(&format!("/v1/repos/{}/backup", repo_id))
        .await;
    response.assert_status(axum::http::StatusCode::ACCEPTED);
    wait_idle(&app, repo_id).await;

    let response = app
        .server
        .get("/v1/jobs")
        .add_query_param("repo_id", repo_id.to_string())
        .await;
    response.assert_status_ok();
    let jobs: Vec<Value> = response.json();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["status"], "completed");
    assert!(jobs[0]["backup_path"].as_str().unwrap().contains("website_"));
    assert!(jobs[0]["file_size"].as_i64().unwrap() > 0);
    assert!(jobs[0]["completed_at"].is_string());

    // Single job lookup
    let job_id = jobs[0]["id"].as_str().unwrap();
    let response = app.server.get(&format!("/v1/jobs/{}", job_id)).await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_job_history_records_failed_run() {
    let app = create_test_app().await;
    let repo_id = register_repo(&app, "https://github.com/acme/unreachable.git").await;

    let response = app
        .server
        .post(&format!("/v1/repos/{}/backup", repo_id))
        .await;
    response.assert_status(axum::http::StatusCode::ACCEPTED);
    wait_idle(&app, repo_id).await;

    let response = app
        .server
        .get("/v1/jobs")
        .add_query_param("repo_id", repo_id.to_string())
        .await;
    let jobs: Vec<Value> = response.json();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["status"], "failed");
    assert!(jobs[0]["backup_path"].is_null());
    assert!(jobs[0]["error_message"]
        .as_str()
        .unwrap()
        .contains("could not resolve host"));
}

#[tokio::test]
async fn test_jobs_listing_is_newest_first_and_filtered() {
    let app = create_test_app().await;
    let first = register_repo(&app, "https://github.com/acme/alpha.git").await;
    let second = register_repo(&app, "https://github.com/acme/beta.git").await;

    for repo_id in [first, second] {
        app.server
            .post(&format!("/v1/repos/{}/backup", repo_id))
            .await
            .assert_status(axum::http::StatusCode::ACCEPTED);
        wait_idle(&app, repo_id).await;
    }

    // Unfiltered listing covers both repositories
    let response = app.server.get("/v1/jobs").await;
    let jobs: Vec<Value> = response.json();
    assert_eq!(jobs.len(), 2);

    // Filtered listing only returns the requested repository
    let response = app
        .server
        .get("/v1/jobs")
        .add_query_param("repo_id", first.to_string())
        .await;
    let jobs: Vec<Value> = response.json();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["repo_id"], first.to_string());
}

#[tokio::test]
async fn test_unknown_job_returns_404() {
    let app = create_test_app().await;
    let response = app.server.get(&format!("/v1/jobs/{}", Uuid::new_v4())).await;
    response.assert_status_not_found();
}
