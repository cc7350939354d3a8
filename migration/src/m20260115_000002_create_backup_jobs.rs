// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 备份任务表迁移
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    /// 应用数据库迁移
    ///
    /// # 参数
    ///
    /// * `manager` - 数据库模式管理器
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 迁移成功
    /// * `Err(DbErr)` - 迁移失败
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BackupJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BackupJobs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BackupJobs::RepoId).uuid().not_null())
                    .col(ColumnDef::new(BackupJobs::UserId).uuid().not_null())
                    .col(ColumnDef::new(BackupJobs::Status).string().not_null())
                    .col(ColumnDef::new(BackupJobs::BackupPath).string().null())
                    .col(ColumnDef::new(BackupJobs::FileSize).big_integer().null())
                    .col(ColumnDef::new(BackupJobs::ErrorMessage).text().null())
                    .col(
                        ColumnDef::new(BackupJobs::StartedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(BackupJobs::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(BackupJobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index for the job history listing, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_backup_jobs_repo_started")
                    .table(BackupJobs::Table)
                    .col(BackupJobs::RepoId)
                    .col(BackupJobs::StartedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    /// 回滚数据库迁移
    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BackupJobs::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum BackupJobs {
    Table,
    Id,
    RepoId,
    UserId,
    Status,
    BackupPath,
    FileSize,
    ErrorMessage,
    StartedAt,
    CompletedAt,
    CreatedAt,
}
