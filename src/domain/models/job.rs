// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::repo::DomainError;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 备份任务实体
///
/// 表示对一个仓库的一次备份执行。状态只能单向推进：
/// Pending → Running → Completed/Failed，终态后记录不再变化。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupJob {
    /// 任务唯一标识符
    pub id: Uuid,
    /// 目标仓库ID
    pub repo_id: Uuid,
    /// 所属用户ID
    pub user_id: Uuid,
    /// 任务状态
    pub status: JobStatus,
    /// 产出的备份路径，完成后填充
    pub backup_path: Option<String>,
    /// 备份大小（字节），完成后填充
    pub file_size: Option<i64>,
    /// 失败原因
    pub error_message: Option<String>,
    /// 开始执行时间
    pub started_at: Option<DateTime<FixedOffset>>,
    /// 结束时间
    pub completed_at: Option<DateTime<FixedOffset>>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
}

/// 任务状态枚举
///
/// 状态转换遵循以下流程：
/// Pending → Running → Completed/Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// 已创建，尚未开始执行
    #[default]
    Pending,
    /// 执行中
    Running,
    /// 成功完成
    Completed,
    /// 执行失败
    Failed,
}

impl JobStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(()),
        }
    }
}

impl BackupJob {
    /// 为指定仓库创建一个新任务
    ///
    /// # 参数
    ///
    /// * `repo_id` - 目标仓库ID
    /// * `user_id` - 所属用户ID
    ///
    /// # 返回值
    ///
    /// 返回处于Pending状态的新任务
    pub fn new(repo_id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            repo_id,
            user_id,
            status: JobStatus::Pending,
            backup_path: None,
            file_size: None,
            error_message: None,
            started_at: None,
            completed_at: None,
            created_at: Utc::now().into(),
        }
    }

    /// 启动任务
    ///
    /// 将任务状态从Pending变更为Running并记录开始时间
    pub fn start(mut self) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Pending => {
                self.status = JobStatus::Running;
                self.started_at = Some(Utc::now().into());
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 完成任务
    ///
    /// 将任务状态从Running变更为Completed并记录产出
    ///
    /// # 参数
    ///
    /// * `backup_path` - 产出的备份路径
    /// * `file_size` - 备份大小（字节）
    pub fn complete(mut self, backup_path: String, file_size: i64) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Running => {
                self.status = JobStatus::Completed;
                self.backup_path = Some(backup_path);
                self.file_size = Some(file_size);
                self.completed_at = Some(Utc::now().into());
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 标记任务失败
    ///
    /// 将任务状态从Running变更为Failed并记录失败原因
    pub fn fail(mut self, error_message: String) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Running => {
                self.status = JobStatus::Failed;
                self.error_message = Some(error_message);
                self.completed_at = Some(Utc::now().into());
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions_are_monotonic() {
        let job = BackupJob::new(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(job.status, JobStatus::Pending);

        let job = job.start().unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert!(job.started_at.is_some());

        let done = job
            .clone()
            .complete("/backups/x".to_string(), 42)
            .unwrap();
        assert_eq!(done.status, JobStatus::Completed);
        assert!(done.completed_at.is_some());

        // Terminal jobs cannot move again
        assert!(done.clone().start().is_err());
        assert!(done.clone().fail("late".to_string()).is_err());
        assert!(done.complete("/backups/y".to_string(), 1).is_err());
    }

    #[test]
    fn test_fail_records_message() {
        let job = BackupJob::new(Uuid::new_v4(), Uuid::new_v4())
            .start()
            .unwrap()
            .fail("clone timed out".to_string())
            .unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error_message.as_deref(), Some("clone timed out"));
        assert!(job.backup_path.is_none());
    }

    #[test]
    fn test_pending_cannot_complete() {
        let job = BackupJob::new(Uuid::new_v4(), Uuid::new_v4());
        assert!(job.complete("/backups/x".to_string(), 0).is_err());
    }
}
