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
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    application::dto::repo_response::JobResponse,
    domain::repositories::{job_repository::JobRepository, repo_repository::RepositoryError},
    presentation::errors::AppError,
};

/// 任务列表查询参数
#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    /// 目标仓库，缺省时返回全部任务
    pub repo_id: Option<Uuid>,
    /// 最多返回的记录数
    pub limit: Option<u64>,
}

const DEFAULT_JOB_LIMIT: u64 = 100;

/// 按开始时间倒序列出备份任务
pub async fn list_jobs<J>(
    Extension(job_repo): Extension<Arc<J>>,
    Query(query): Query<ListJobsQuery>,
) -> Result<impl IntoResponse, AppError>
where
    J: JobRepository + 'static,
{
    let limit = query.limit.unwrap_or(DEFAULT_JOB_LIMIT).min(1000);
    let jobs = job_repo.list(query.repo_id, limit).await?;
    let body: Vec<JobResponse> = jobs.into_iter().map(JobResponse::from).collect();
    Ok((StatusCode::OK, Json(body)))
}

/// 获取单个备份任务详情
pub async fn get_job<J>(
    Extension(job_repo): Extension<Arc<J>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    J: JobRepository + 'static,
{
    let job = job_repo
        .find_by_id(job_id)
        .await?
        .ok_or(RepositoryError::NotFound)?;
    Ok((StatusCode::OK, Json(JobResponse::from(job))))
}
