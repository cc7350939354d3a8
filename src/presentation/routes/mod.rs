// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::infrastructure::repositories::job_repo_impl::JobRepositoryImpl;
use crate::infrastructure::repositories::repo_repo_impl::RepoRepositoryImpl;
use crate::presentation::handlers::{job_handler, repo_handler};
use crate::schedule::scheduler::SchedulerStatus;
use axum::{
    extract::Extension,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// 健康检查认为调度器存活的最大心跳间隔（秒）
const SCHEDULER_ALIVE_WINDOW_SECS: i64 = 120;

/// 创建应用路由
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes() -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let api_routes = Router::new()
        .route(
            "/v1/repos",
            post(repo_handler::create_repo::<RepoRepositoryImpl>),
        )
        .route(
            "/v1/repos",
            get(repo_handler::list_repos::<RepoRepositoryImpl>),
        )
        .route("/v1/repos/verify", post(repo_handler::verify_repo))
        .route(
            "/v1/repos/{id}",
            get(repo_handler::get_repo::<RepoRepositoryImpl>),
        )
        .route(
            "/v1/repos/{id}",
            put(repo_handler::update_repo::<RepoRepositoryImpl>),
        )
        .route(
            "/v1/repos/{id}",
            delete(repo_handler::delete_repo::<RepoRepositoryImpl, JobRepositoryImpl>),
        )
        .route(
            "/v1/repos/{id}/backup",
            post(repo_handler::trigger_backup::<RepoRepositoryImpl, JobRepositoryImpl>),
        )
        .route("/v1/jobs", get(job_handler::list_jobs::<JobRepositoryImpl>))
        .route(
            "/v1/jobs/{id}",
            get(job_handler::get_job::<JobRepositoryImpl>),
        );

    Router::new().merge(public_routes).merge(api_routes)
}

/// 健康检查端点
///
/// 除进程存活外还报告调度器心跳状态
pub async fn health_check(
    Extension(status): Extension<Arc<SchedulerStatus>>,
) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "scheduler_alive": status.alive_within(SCHEDULER_ALIVE_WINDOW_SECS),
    }))
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
