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

use crate::domain::models::repo::{Repo, Schedule};
use crate::domain::repositories::repo_repository::{RepoRepository, RepositoryError};
use crate::infrastructure::database::entities::repo as repo_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::{sea_query::Expr, *};
use std::sync::Arc;
use uuid::Uuid;

/// 备份仓库实现
pub struct RepoRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl RepoRepositoryImpl {
    /// 创建新的备份仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

/// 将数据库模型还原为领域模型
///
/// 调度列值非法时返回`Corrupt`，不做静默降级
fn to_domain(m: repo_entity::Model) -> Result<Repo, RepositoryError> {
    let schedule = Schedule::from_parts(
        &m.schedule_kind,
        m.interval_unit.as_deref(),
        m.interval_count,
        m.run_at.as_deref(),
    )
    .map_err(|e| RepositoryError::Corrupt(format!("repo {}: {}", m.id, e)))?;

    let format = m
        .format
        .parse()
        .map_err(|_| RepositoryError::Corrupt(format!("repo {}: bad format {}", m.id, m.format)))?;

    Ok(Repo {
        id: m.id,
        user_id: m.user_id,
        name: m.name,
        url: m.url,
        access_token: m.access_token,
        format,
        schedule,
        retention_count: m.retention_count,
        is_active: m.is_active,
        last_backup_at: m.last_backup_at,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

#[async_trait]
impl RepoRepository for RepoRepositoryImpl {
    async fn create(&self, repo: &Repo) -> Result<Repo, RepositoryError> {
        let (kind, unit, count, at) = repo.schedule.to_parts();
        let model = repo_entity::ActiveModel {
            id: Set(repo.id),
            user_id: Set(repo.user_id),
            name: Set(repo.name.clone()),
            url: Set(repo.url.clone()),
            access_token: Set(repo.access_token.clone()),
            format: Set(repo.format.to_string()),
            schedule_kind: Set(kind),
            interval_unit: Set(unit),
            interval_count: Set(count),
            run_at: Set(at),
            retention_count: Set(repo.retention_count),
            is_active: Set(repo.is_active),
            last_backup_at: Set(repo.last_backup_at),
            created_at: Set(repo.created_at),
            updated_at: Set(repo.updated_at),
        };

        model.insert(self.db.as_ref()).await?;
        Ok(repo.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Repo>, RepositoryError> {
        let model = repo_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        model.map(to_domain).transpose()
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Repo>, RepositoryError> {
        let models = repo_entity::Entity::find()
            .filter(repo_entity::Column::UserId.eq(user_id))
            .order_by_asc(repo_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        models.into_iter().map(to_domain).collect()
    }

    async fn list_active(&self) -> Result<Vec<Repo>, RepositoryError> {
        let models = repo_entity::Entity::find()
            .filter(repo_entity::Column::IsActive.eq(true))
            .all(self.db.as_ref())
            .await?;

        models.into_iter().map(to_domain).collect()
    }

    async fn update(&self, repo: &Repo) -> Result<Repo, RepositoryError> {
        let mut model: repo_entity::ActiveModel = repo_entity::Entity::find_by_id(repo.id)
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)?
            .into();

        let (kind, unit, count, at) = repo.schedule.to_parts();
        model.name = Set(repo.name.clone());
        model.url = Set(repo.url.clone());
        model.access_token = Set(repo.access_token.clone());
        model.format = Set(repo.format.to_string());
        model.schedule_kind = Set(kind);
        model.interval_unit = Set(unit);
        model.interval_count = Set(count);
        model.run_at = Set(at);
        model.retention_count = Set(repo.retention_count);
        model.is_active = Set(repo.is_active);
        model.updated_at = Set(repo.updated_at);

        model.update(self.db.as_ref()).await?;
        Ok(repo.clone())
    }

    async fn set_last_backup(
        &self,
        id: Uuid,
        at: DateTime<FixedOffset>,
    ) -> Result<(), RepositoryError> {
        repo_entity::Entity::update_many()
            .col_expr(repo_entity::Column::LastBackupAt, Expr::value(at))
            .col_expr(
                repo_entity::Column::UpdatedAt,
                Expr::value(DateTime::<FixedOffset>::from(chrono::Utc::now())),
            )
            .filter(repo_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        repo_entity::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }
}
