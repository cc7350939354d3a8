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

use crate::{
    application::dto::repo_request::{CreateRepoRequest, ScheduleDto, UpdateRepoRequest},
    domain::{
        models::repo::{DomainError, Repo, Schedule},
        repositories::repo_repository::{RepoRepository, RepositoryError},
    },
};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

#[derive(Error, Debug)]
pub enum RepoUseCaseError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Repository not found")]
    NotFound,
}

impl From<DomainError> for RepoUseCaseError {
    fn from(e: DomainError) -> Self {
        RepoUseCaseError::ValidationError(e.to_string())
    }
}

/// 仓库管理用例
///
/// 承载注册、查询、更新的业务规则；删除和手动触发
/// 涉及运行中任务，由执行器处理
pub struct RepoUseCase<R> {
    repo_repo: Arc<R>,
}

impl<R> RepoUseCase<R>
where
    R: RepoRepository + 'static,
{
    pub fn new(repo_repo: Arc<R>) -> Self {
        Self { repo_repo }
    }

    /// 注册新的备份仓库
    pub async fn create_repo(&self, req: CreateRepoRequest) -> Result<Repo, RepoUseCaseError> {
        req.validate()
            .map_err(|e| RepoUseCaseError::ValidationError(e.to_string()))?;

        let schedule = build_schedule(&req.schedule)?;
        let format = match req.format.as_deref() {
            Some(f) => f.parse().map_err(|_| {
                RepoUseCaseError::ValidationError(format!("unknown backup format: {}", f))
            })?,
            None => Default::default(),
        };

        let mut repo = Repo::new(
            req.user_id,
            req.url,
            normalize_token(req.access_token),
            format,
            schedule,
            req.retention_count.unwrap_or(5),
        );
        if let Some(active) = req.is_active {
            repo.is_active = active;
        }
        repo.validate()?;

        Ok(self.repo_repo.create(&repo).await?)
    }

    /// 查询单个仓库
    pub async fn get_repo(&self, id: Uuid) -> Result<Repo, RepoUseCaseError> {
        self.repo_repo
            .find_by_id(id)
            .await?
            .ok_or(RepoUseCaseError::NotFound)
    }

    /// 列出用户的全部仓库
    pub async fn list_repos(&self, user_id: Uuid) -> Result<Vec<Repo>, RepoUseCaseError> {
        Ok(self.repo_repo.list_by_user(user_id).await?)
    }

    /// 更新仓库配置
    ///
    /// 缺省字段保持原值，调度和保留策略的改动从下一次评估起生效
    pub async fn update_repo(
        &self,
        id: Uuid,
        req: UpdateRepoRequest,
    ) -> Result<Repo, RepoUseCaseError> {
        req.validate()
            .map_err(|e| RepoUseCaseError::ValidationError(e.to_string()))?;

        let mut repo = self.get_repo(id).await?;

        if let Some(token) = req.access_token {
            repo.access_token = normalize_token(Some(token));
        }
        if let Some(format) = req.format.as_deref() {
            repo.format = format.parse().map_err(|_| {
                RepoUseCaseError::ValidationError(format!("unknown backup format: {}", format))
            })?;
        }
        if let Some(schedule) = &req.schedule {
            repo.schedule = build_schedule(schedule)?;
        }
        if let Some(retention) = req.retention_count {
            repo.retention_count = retention;
        }
        if let Some(active) = req.is_active {
            repo.is_active = active;
        }
        repo.updated_at = Utc::now().into();
        repo.validate()?;

        Ok(self.repo_repo.update(&repo).await?)
    }
}

fn build_schedule(dto: &ScheduleDto) -> Result<Schedule, DomainError> {
    Schedule::from_parts(
        &dto.kind,
        dto.interval_unit.as_deref(),
        dto.interval_count,
        dto.run_at.as_deref(),
    )
}

/// 空白令牌视同未配置
fn normalize_token(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.trim().is_empty())
}

#[cfg(test)]
#[path = "repo_use_case_test.rs"]
mod tests;
