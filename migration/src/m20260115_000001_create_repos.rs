// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 备份仓库表迁移
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
                    .table(Repos::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Repos::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Repos::UserId).uuid().not_null())
                    .col(ColumnDef::new(Repos::Name).string().not_null())
                    .col(ColumnDef::new(Repos::Url).string().not_null())
                    .col(ColumnDef::new(Repos::AccessToken).string().null())
                    .col(ColumnDef::new(Repos::Format).string().not_null())
                    .col(ColumnDef::new(Repos::ScheduleKind).string().not_null())
                    .col(ColumnDef::new(Repos::IntervalUnit).string().null())
                    .col(ColumnDef::new(Repos::IntervalCount).integer().null())
                    .col(ColumnDef::new(Repos::RunAt).string().null())
                    .col(
                        ColumnDef::new(Repos::RetentionCount)
                            .integer()
                            .not_null()
                            .default(5),
                    )
                    .col(
                        ColumnDef::new(Repos::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Repos::LastBackupAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Repos::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Repos::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index for per-user listing
        manager
            .create_index(
                Index::create()
                    .name("idx_repos_user")
                    .table(Repos::Table)
                    .col(Repos::UserId)
                    .to_owned(),
            )
            .await?;

        // Index for the scheduler's active-repo scan
        manager
            .create_index(
                Index::create()
                    .name("idx_repos_active")
                    .table(Repos::Table)
                    .col(Repos::IsActive)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    /// 回滚数据库迁移
    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Repos::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Repos {
    Table,
    Id,
    UserId,
    Name,
    Url,
    AccessToken,
    Format,
    ScheduleKind,
    IntervalUnit,
    IntervalCount,
    RunAt,
    RetentionCount,
    IsActive,
    LastBackupAt,
    CreatedAt,
    UpdatedAt,
}
