// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, wait_idle};
use gitvaultrs::domain::repositories::repo_repository::RepoRepository;
use gitvaultrs::schedule::scheduler::BackupScheduler;
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

#[tokio::test]
async fn test_retention_keeps_only_newest_artifacts() {
    let app = create_test_app().await;
    let user_id = Uuid::new_v4();

    let response = app
        .server
        .post("/v1/repos")
        .json(&json!({
            "user_id": user_id,
            "url": "https://github.com/acme/website.git",
            "format": "targz",
            "schedule": { "kind": "manual" },
            "retention_count": 2
        }))
        .await;
    let created: Value = response.json();
    let repo_id: Uuid = created["id"].as_str().unwrap().parse().unwrap();

    for _ in 0..3 {
        app.server
            .post(&format!("/v1/repos/{}/backup", repo_id))
            .await
            .assert_status(axum::http::StatusCode::ACCEPTED);
        wait_idle(&app, repo_id).await;
        // Artifact names carry a second-granularity timestamp
        tokio::time::sleep(Duration::from_millis(1100)).await;
    }

    let repo_dir = app
        .backup_root
        .path()
        .join(format!("user_{}", user_id))
        .join("website");
    let mut artifacts: Vec<String> = std::fs::read_dir(&repo_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    artifacts.sort();

    assert_eq!(artifacts.len(), 2, "older artifacts pruned: {:?}", artifacts);
    assert!(artifacts.iter().all(|a| a.starts_with("website_")));
    assert!(artifacts.iter().all(|a| a.ends_with(".tar.gz")));

    // All three runs stay in the history even after pruning
    let response = app
        .server
        .get("/v1/jobs")
        .add_query_param("repo_id", repo_id.to_string())
        .await;
    let jobs: Vec<Value> = response.json();
    assert_eq!(jobs.len(), 3);
    assert!(jobs.iter().all(|j| j["status"] == "completed"));
}

#[tokio::test]
async fn test_scheduler_loop_dispatches_overdue_repo() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/v1/repos")
        .json(&json!({
            "user_id": Uuid::new_v4(),
            "url": "https://github.com/acme/website.git",
            "schedule": { "kind": "hourly" },
            "retention_count": 2
        }))
        .await;
    let created: Value = response.json();
    let repo_id: Uuid = created["id"].as_str().unwrap().parse().unwrap();

    // A repo that has never run is due immediately
    let scheduler = BackupScheduler::new(app.executor.clone(), Duration::from_millis(100));
    let status = scheduler.status();
    let handle = scheduler.start();

    let mut jobs: Vec<Value> = Vec::new();
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let response = app
            .server
            .get("/v1/jobs")
            .add_query_param("repo_id", repo_id.to_string())
            .await;
        jobs = response.json();
        if !jobs.is_empty() && jobs[0]["status"] == "completed" {
            break;
        }
    }
    handle.abort();

    assert_eq!(jobs.len(), 1, "scheduler should dispatch exactly one job");
    assert_eq!(jobs[0]["status"], "completed");
    assert!(status.alive_within(60));

    // last_backup_at was stamped when the job started
    let repo = app
        .repo_repo
        .find_by_id(repo_id)
        .await
        .unwrap()
        .expect("repo exists");
    assert!(repo.last_backup_at.is_some());
}
