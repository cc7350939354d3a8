// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::repo::Repo;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 持久化的列值无法还原成领域模型
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// 备份仓库特质
///
/// 定义备份目标的数据访问接口。该特质遵循依赖倒置原则，
/// 确保领域层不依赖于具体的数据存储实现。
#[async_trait]
pub trait RepoRepository: Send + Sync {
    /// 创建仓库
    async fn create(&self, repo: &Repo) -> Result<Repo, RepositoryError>;
    /// 根据ID查找仓库
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Repo>, RepositoryError>;
    /// 列出用户的全部仓库
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Repo>, RepositoryError>;
    /// 列出所有参与自动调度的仓库
    async fn list_active(&self) -> Result<Vec<Repo>, RepositoryError>;
    /// 更新仓库
    async fn update(&self, repo: &Repo) -> Result<Repo, RepositoryError>;
    /// 记录最近一次备份的开始时间
    async fn set_last_backup(
        &self,
        id: Uuid,
        at: DateTime<FixedOffset>,
    ) -> Result<(), RepositoryError>;
    /// 删除仓库
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}
