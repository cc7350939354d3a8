// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::{
    application::{
        dto::{
            repo_request::{CreateRepoRequest, UpdateRepoRequest, VerifyRepoRequest},
            repo_response::{JobResponse, RepoResponse, VerifyRepoResponse},
        },
        use_cases::repo_use_case::{RepoUseCase, RepoUseCaseError},
    },
    backup::verify::{GithubVerifier, VerifyError},
    config::settings::Settings,
    domain::repositories::{job_repository::JobRepository, repo_repository::RepoRepository},
    workers::executor::{ExecutorError, JobExecutor},
};

/// 仓库列表查询参数
#[derive(Debug, Deserialize)]
pub struct ListReposQuery {
    pub user_id: Uuid,
}

/// 注册新的备份仓库
pub async fn create_repo<R>(
    Extension(repo_repo): Extension<Arc<R>>,
    Json(payload): Json<CreateRepoRequest>,
) -> impl IntoResponse
where
    R: RepoRepository + 'static,
{
    let use_case = RepoUseCase::new(repo_repo);
    match use_case.create_repo(payload).await {
        Ok(repo) => (StatusCode::CREATED, Json(RepoResponse::from(repo))).into_response(),
        Err(e) => {
            let (status, msg): (StatusCode, String) = e.into();
            (status, Json(json!({ "error": msg }))).into_response()
        }
    }
}

/// 列出用户的全部仓库
pub async fn list_repos<R>(
    Extension(repo_repo): Extension<Arc<R>>,
    Query(query): Query<ListReposQuery>,
) -> impl IntoResponse
where
    R: RepoRepository + 'static,
{
    let use_case = RepoUseCase::new(repo_repo);
    match use_case.list_repos(query.user_id).await {
        Ok(repos) => {
            let body: Vec<RepoResponse> = repos.into_iter().map(RepoResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            let (status, msg): (StatusCode, String) = e.into();
            (status, Json(json!({ "error": msg }))).into_response()
        }
    }
}

/// 获取仓库详情
pub async fn get_repo<R>(
    Extension(repo_repo): Extension<Arc<R>>,
    Path(repo_id): Path<Uuid>,
) -> impl IntoResponse
where
    R: RepoRepository + 'static,
{
    let use_case = RepoUseCase::new(repo_repo);
    match use_case.get_repo(repo_id).await {
        Ok(repo) => (StatusCode::OK, Json(RepoResponse::from(repo))).into_response(),
        Err(e) => {
            let (status, msg): (StatusCode, String) = e.into();
            (status, Json(json!({ "error": msg }))).into_response()
        }
    }
}

/// 更新仓库配置
pub async fn update_repo<R>(
    Extension(repo_repo): Extension<Arc<R>>,
    Path(repo_id): Path<Uuid>,
    Json(payload): Json<UpdateRepoRequest>,
) -> impl IntoResponse
where
    R: RepoRepository + 'static,
{
    let use_case = RepoUseCase::new(repo_repo);
    match use_case.update_repo(repo_id, payload).await {
        Ok(repo) => (StatusCode::OK, Json(RepoResponse::from(repo))).into_response(),
        Err(e) => {
            let (status, msg): (StatusCode, String) = e.into();
            (status, Json(json!({ "error": msg }))).into_response()
        }
    }
}

/// 删除仓库及其全部备份
///
/// 进行中的备份先等待其结束，超时则返回409
pub async fn delete_repo<R, J>(
    Extension(executor): Extension<Arc<JobExecutor<R, J>>>,
    Extension(settings): Extension<Arc<Settings>>,
    Path(repo_id): Path<Uuid>,
) -> impl IntoResponse
where
    R: RepoRepository + 'static,
    J: JobRepository + 'static,
{
    let max_wait = Duration::from_secs(settings.backup.delete_wait_secs);
    match executor.delete_repo(repo_id, max_wait).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            let (status, msg): (StatusCode, String) = e.into();
            (status, Json(json!({ "error": msg }))).into_response()
        }
    }
}

/// 手动触发一次备份
///
/// 任务异步执行，接受后立即返回202；同一仓库已有
/// 进行中的任务时返回409
pub async fn trigger_backup<R, J>(
    Extension(executor): Extension<Arc<JobExecutor<R, J>>>,
    Path(repo_id): Path<Uuid>,
) -> impl IntoResponse
where
    R: RepoRepository + 'static,
    J: JobRepository + 'static,
{
    match executor.trigger_now(repo_id).await {
        Ok(job) => (StatusCode::ACCEPTED, Json(JobResponse::from(job))).into_response(),
        Err(e) => {
            let (status, msg): (StatusCode, String) = e.into();
            (status, Json(json!({ "error": msg }))).into_response()
        }
    }
}

/// 校验仓库可达性
///
/// 通过GitHub API确认地址和令牌有效，不入库
pub async fn verify_repo(
    Extension(verifier): Extension<Arc<GithubVerifier>>,
    Json(payload): Json<VerifyRepoRequest>,
) -> impl IntoResponse {
    match verifier
        .verify(&payload.url, payload.access_token.as_deref())
        .await
    {
        Ok(full_name) => (
            StatusCode::OK,
            Json(VerifyRepoResponse {
                accessible: true,
                full_name: Some(full_name),
                error: None,
            }),
        )
            .into_response(),
        Err(VerifyError::InvalidUrl) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid GitHub repository URL" })),
        )
            .into_response(),
        Err(VerifyError::AccessDenied(msg)) => (
            StatusCode::OK,
            Json(VerifyRepoResponse {
                accessible: false,
                full_name: None,
                error: Some(msg),
            }),
        )
            .into_response(),
        Err(VerifyError::Request(e)) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

impl From<RepoUseCaseError> for (StatusCode, String) {
    fn from(err: RepoUseCaseError) -> Self {
        match err {
            RepoUseCaseError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            RepoUseCaseError::Repository(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            RepoUseCaseError::NotFound => {
                (StatusCode::NOT_FOUND, "Repository not found".to_string())
            }
        }
    }
}

impl From<ExecutorError> for (StatusCode, String) {
    fn from(err: ExecutorError) -> Self {
        match err {
            ExecutorError::AlreadyRunning => (StatusCode::CONFLICT, err.to_string()),
            ExecutorError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
            ExecutorError::Repository(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ExecutorError::Domain(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        }
    }
}
