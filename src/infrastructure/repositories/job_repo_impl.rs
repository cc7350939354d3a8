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

use crate::domain::models::job::BackupJob;
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::repo_repository::RepositoryError;
use crate::infrastructure::database::entities::backup_job as job_entity;
use async_trait::async_trait;
use sea_orm::*;
use std::sync::Arc;
use uuid::Uuid;

/// 备份任务仓库实现
pub struct JobRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl JobRepositoryImpl {
    /// 创建新的任务仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn to_domain(m: job_entity::Model) -> Result<BackupJob, RepositoryError> {
    let status = m
        .status
        .parse()
        .map_err(|_| RepositoryError::Corrupt(format!("job {}: bad status {}", m.id, m.status)))?;

    Ok(BackupJob {
        id: m.id,
        repo_id: m.repo_id,
        user_id: m.user_id,
        status,
        backup_path: m.backup_path,
        file_size: m.file_size,
        error_message: m.error_message,
        started_at: m.started_at,
        completed_at: m.completed_at,
        created_at: m.created_at,
    })
}

#[async_trait]
impl JobRepository for JobRepositoryImpl {
    async fn create(&self, job: &BackupJob) -> Result<BackupJob, RepositoryError> {
        let model = job_entity::ActiveModel {
            id: Set(job.id),
            repo_id: Set(job.repo_id),
            user_id: Set(job.user_id),
            status: Set(job.status.to_string()),
            backup_path: Set(job.backup_path.clone()),
            file_size: Set(job.file_size),
            error_message: Set(job.error_message.clone()),
            started_at: Set(job.started_at),
            completed_at: Set(job.completed_at),
            created_at: Set(job.created_at),
        };

        model.insert(self.db.as_ref()).await?;
        Ok(job.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BackupJob>, RepositoryError> {
        let model = job_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        model.map(to_domain).transpose()
    }

    async fn update(&self, job: &BackupJob) -> Result<BackupJob, RepositoryError> {
        let mut model: job_entity::ActiveModel = job_entity::Entity::find_by_id(job.id)
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)?
            .into();

        model.status = Set(job.status.to_string());
        model.backup_path = Set(job.backup_path.clone());
        model.file_size = Set(job.file_size);
        model.error_message = Set(job.error_message.clone());
        model.started_at = Set(job.started_at);
        model.completed_at = Set(job.completed_at);

        model.update(self.db.as_ref()).await?;
        Ok(job.clone())
    }

    async fn list(
        &self,
        repo_id: Option<Uuid>,
        limit: u64,
    ) -> Result<Vec<BackupJob>, RepositoryError> {
        let mut query = job_entity::Entity::find();

        if let Some(repo_id) = repo_id {
            query = query.filter(job_entity::Column::RepoId.eq(repo_id));
        }

        let models = query
            .order_by_desc(job_entity::Column::StartedAt)
            .order_by_desc(job_entity::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        models.into_iter().map(to_domain).collect()
    }
}
