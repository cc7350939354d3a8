// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::repo_repository::RepositoryError;
use crate::domain::models::job::BackupJob;
use async_trait::async_trait;
use uuid::Uuid;

/// 备份任务仓库特质
///
/// 定义任务记录的数据访问接口。任务记录只由执行器写入，
/// 对外仅通过查询暴露，调度核心从不删除历史记录。
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// 创建任务记录
    async fn create(&self, job: &BackupJob) -> Result<BackupJob, RepositoryError>;
    /// 根据ID查找任务
    async fn find_by_id(&self, id: Uuid) -> Result<Option<BackupJob>, RepositoryError>;
    /// 更新任务记录
    async fn update(&self, job: &BackupJob) -> Result<BackupJob, RepositoryError>;
    /// 按开始时间倒序列出任务，可按仓库过滤
    async fn list(
        &self,
        repo_id: Option<Uuid>,
        limit: u64,
    ) -> Result<Vec<BackupJob>, RepositoryError>;
}
