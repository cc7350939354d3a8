// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::repo_request::ScheduleDto;
use crate::domain::models::job::BackupJob;
use crate::domain::models::repo::Repo;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 仓库响应
///
/// 访问令牌从不回传，只暴露是否配置过
#[derive(Debug, Serialize, Deserialize)]
pub struct RepoResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub url: String,
    pub has_token: bool,
    pub format: String,
    pub schedule: ScheduleDto,
    pub retention_count: i32,
    pub is_active: bool,
    pub last_backup_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<Repo> for RepoResponse {
    fn from(repo: Repo) -> Self {
        let (kind, interval_unit, interval_count, run_at) = repo.schedule.to_parts();
        Self {
            id: repo.id,
            user_id: repo.user_id,
            name: repo.name,
            url: repo.url,
            has_token: repo.access_token.as_deref().is_some_and(|t| !t.is_empty()),
            format: repo.format.to_string(),
            schedule: ScheduleDto {
                kind,
                interval_unit,
                interval_count,
                run_at,
            },
            retention_count: repo.retention_count,
            is_active: repo.is_active,
            last_backup_at: repo.last_backup_at,
            created_at: repo.created_at,
            updated_at: repo.updated_at,
        }
    }
}

/// 备份任务响应
#[derive(Debug, Serialize, Deserialize)]
pub struct JobResponse {
    pub id: Uuid,
    pub repo_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub backup_path: Option<String>,
    pub file_size: Option<i64>,
    pub error_message: Option<String>,
    pub started_at: Option<DateTime<FixedOffset>>,
    pub completed_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
}

impl From<BackupJob> for JobResponse {
    fn from(job: BackupJob) -> Self {
        Self {
            id: job.id,
            repo_id: job.repo_id,
            user_id: job.user_id,
            status: job.status.to_string(),
            backup_path: job.backup_path,
            file_size: job.file_size,
            error_message: job.error_message,
            started_at: job.started_at,
            completed_at: job.completed_at,
            created_at: job.created_at,
        }
    }
}

/// 仓库可达性校验响应
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyRepoResponse {
    pub accessible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
