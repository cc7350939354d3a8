// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// 保留数量的下限
pub const MIN_RETENTION: i32 = 1;
/// 保留数量的上限
pub const MAX_RETENTION: i32 = 50;

/// 备份仓库实体
///
/// 表示一个已注册的GitHub仓库备份目标，持有克隆地址、
/// 访问凭证、归档格式、调度策略和保留策略等配置。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repo {
    /// 仓库唯一标识符
    pub id: Uuid,
    /// 所属用户ID，用于隔离备份目录和任务记录
    pub user_id: Uuid,
    /// 仓库名称，取自克隆地址的最后一段
    pub name: String,
    /// 克隆地址
    pub url: String,
    /// 访问令牌，私有仓库需要
    pub access_token: Option<String>,
    /// 归档格式
    pub format: BackupFormat,
    /// 调度策略
    pub schedule: Schedule,
    /// 保留的备份数量，范围[1,50]
    pub retention_count: i32,
    /// 是否参与自动调度
    pub is_active: bool,
    /// 最近一次备份的开始时间
    pub last_backup_at: Option<DateTime<FixedOffset>>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}

/// 归档格式枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackupFormat {
    /// 目录树，原样复制
    #[default]
    Folder,
    /// 单个zip文件
    Zip,
    /// 单个tar.gz文件
    Targz,
}

impl BackupFormat {
    /// 归档文件的扩展名，目录格式没有扩展名
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            BackupFormat::Folder => None,
            BackupFormat::Zip => Some("zip"),
            BackupFormat::Targz => Some("tar.gz"),
        }
    }
}

impl fmt::Display for BackupFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BackupFormat::Folder => write!(f, "folder"),
            BackupFormat::Zip => write!(f, "zip"),
            BackupFormat::Targz => write!(f, "targz"),
        }
    }
}

impl FromStr for BackupFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "folder" => Ok(BackupFormat::Folder),
            "zip" => Ok(BackupFormat::Zip),
            "targz" => Ok(BackupFormat::Targz),
            _ => Err(()),
        }
    }
}

/// 自定义调度的间隔单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalUnit {
    /// 天
    Day,
    /// 周
    Week,
    /// 月，按日历月计算
    Month,
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IntervalUnit::Day => write!(f, "day"),
            IntervalUnit::Week => write!(f, "week"),
            IntervalUnit::Month => write!(f, "month"),
        }
    }
}

impl FromStr for IntervalUnit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(IntervalUnit::Day),
            "week" => Ok(IntervalUnit::Week),
            "month" => Ok(IntervalUnit::Month),
            _ => Err(()),
        }
    }
}

/// 调度策略枚举
///
/// 以和类型表示调度配置，使非法组合（如缺少间隔的自定义调度）
/// 无法构造。预定义节奏使用固定锚点：每日02:00、每周日02:00、
/// 每月1日02:00。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    /// 仅手动触发
    Manual,
    /// 每小时整点
    Hourly,
    /// 每日02:00
    Daily,
    /// 每周日02:00
    Weekly,
    /// 每月1日02:00
    Monthly,
    /// 自定义间隔：每count个单位、在指定时刻执行
    Custom {
        unit: IntervalUnit,
        count: u32,
        at: NaiveTime,
    },
}

impl Schedule {
    /// 调度类别的持久化标识
    pub fn kind(&self) -> &'static str {
        match self {
            Schedule::Manual => "manual",
            Schedule::Hourly => "hourly",
            Schedule::Daily => "daily",
            Schedule::Weekly => "weekly",
            Schedule::Monthly => "monthly",
            Schedule::Custom { .. } => "custom",
        }
    }

    /// 从持久化的列值重建调度策略
    ///
    /// # 参数
    ///
    /// * `kind` - 调度类别标识
    /// * `unit` - 自定义间隔单位（仅custom）
    /// * `count` - 自定义间隔数量（仅custom）
    /// * `at` - 自定义执行时刻，"HH:MM"（仅custom）
    ///
    /// # 返回值
    ///
    /// * `Ok(Schedule)` - 重建的调度策略
    /// * `Err(DomainError)` - 列值缺失或非法
    pub fn from_parts(
        kind: &str,
        unit: Option<&str>,
        count: Option<i32>,
        at: Option<&str>,
    ) -> Result<Self, DomainError> {
        match kind {
            "manual" => Ok(Schedule::Manual),
            "hourly" => Ok(Schedule::Hourly),
            "daily" => Ok(Schedule::Daily),
            "weekly" => Ok(Schedule::Weekly),
            "monthly" => Ok(Schedule::Monthly),
            "custom" => {
                let unit = unit
                    .and_then(|u| u.parse().ok())
                    .ok_or_else(|| DomainError::ScheduleConfig("missing interval unit".into()))?;
                let count = match count {
                    Some(c) if c >= 1 => c as u32,
                    _ => {
                        return Err(DomainError::ScheduleConfig(
                            "interval count must be at least 1".into(),
                        ))
                    }
                };
                let at = at
                    .and_then(|t| NaiveTime::parse_from_str(t, "%H:%M").ok())
                    .ok_or_else(|| DomainError::ScheduleConfig("invalid time of day".into()))?;
                Ok(Schedule::Custom { unit, count, at })
            }
            other => Err(DomainError::ScheduleConfig(format!(
                "unknown schedule kind: {}",
                other
            ))),
        }
    }

    /// 拆解为持久化的列值
    ///
    /// # 返回值
    ///
    /// 返回(kind, interval_unit, interval_count, run_at)
    pub fn to_parts(&self) -> (String, Option<String>, Option<i32>, Option<String>) {
        match self {
            Schedule::Custom { unit, count, at } => (
                self.kind().to_string(),
                Some(unit.to_string()),
                Some(*count as i32),
                Some(at.format("%H:%M").to_string()),
            ),
            _ => (self.kind().to_string(), None, None, None),
        }
    }

    /// 校验调度配置
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Schedule::Custom { count, .. } = self {
            if *count < 1 {
                return Err(DomainError::ScheduleConfig(
                    "interval count must be at least 1".into(),
                ));
            }
        }
        Ok(())
    }
}

/// 领域错误类型
#[derive(Error, Debug)]
pub enum DomainError {
    /// 无效的状态转换，任务状态只能单向推进
    #[error("Invalid state transition")]
    InvalidStateTransition,

    /// 验证错误，输入不符合领域规则
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 调度配置错误，在持久化前拒绝
    #[error("Invalid schedule configuration: {0}")]
    ScheduleConfig(String),
}

impl Repo {
    /// 创建一个新的备份仓库
    ///
    /// # 参数
    ///
    /// * `user_id` - 所属用户ID
    /// * `url` - 克隆地址，仓库名从最后一段推导
    /// * `access_token` - 访问令牌
    /// * `format` - 归档格式
    /// * `schedule` - 调度策略
    /// * `retention_count` - 保留的备份数量
    ///
    /// # 返回值
    ///
    /// 返回新创建的仓库实例，尚未校验
    pub fn new(
        user_id: Uuid,
        url: String,
        access_token: Option<String>,
        format: BackupFormat,
        schedule: Schedule,
        retention_count: i32,
    ) -> Self {
        let name = repo_name_from_url(&url);
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            url,
            access_token,
            format,
            schedule,
            retention_count,
            is_active: true,
            last_backup_at: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    /// 校验仓库配置
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 配置合法
    /// * `Err(DomainError)` - 配置非法，不应持久化
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.url.trim().is_empty() {
            return Err(DomainError::ValidationError("url cannot be empty".into()));
        }
        if self.name.is_empty() {
            return Err(DomainError::ValidationError(
                "repository name cannot be derived from url".into(),
            ));
        }
        if !(MIN_RETENTION..=MAX_RETENTION).contains(&self.retention_count) {
            return Err(DomainError::ValidationError(format!(
                "retention count must be in [{}, {}]",
                MIN_RETENTION, MAX_RETENTION
            )));
        }
        self.schedule.validate()
    }
}

/// 从克隆地址推导仓库名称
///
/// 取路径最后一段并去掉`.git`后缀
pub fn repo_name_from_url(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .trim_end_matches(".git")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_name_from_url() {
        assert_eq!(repo_name_from_url("https://github.com/a/b.git"), "b");
        assert_eq!(repo_name_from_url("https://github.com/a/b"), "b");
        assert_eq!(repo_name_from_url("https://github.com/a/b/"), "b");
    }

    #[test]
    fn test_retention_bounds() {
        let mut repo = Repo::new(
            Uuid::new_v4(),
            "https://github.com/a/b.git".to_string(),
            None,
            BackupFormat::Zip,
            Schedule::Daily,
            5,
        );
        assert!(repo.validate().is_ok());

        repo.retention_count = 0;
        assert!(repo.validate().is_err());

        repo.retention_count = 51;
        assert!(repo.validate().is_err());

        repo.retention_count = 50;
        assert!(repo.validate().is_ok());
    }

    #[test]
    fn test_schedule_round_trip() {
        let schedule = Schedule::Custom {
            unit: IntervalUnit::Week,
            count: 2,
            at: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        };
        let (kind, unit, count, at) = schedule.to_parts();
        let rebuilt =
            Schedule::from_parts(&kind, unit.as_deref(), count, at.as_deref()).unwrap();
        assert_eq!(rebuilt, schedule);

        let (kind, unit, count, at) = Schedule::Weekly.to_parts();
        assert_eq!(kind, "weekly");
        assert!(unit.is_none() && count.is_none() && at.is_none());
    }

    #[test]
    fn test_schedule_rejects_bad_parts() {
        assert!(Schedule::from_parts("custom", Some("day"), Some(0), Some("09:00")).is_err());
        assert!(Schedule::from_parts("custom", None, Some(1), Some("09:00")).is_err());
        assert!(Schedule::from_parts("custom", Some("day"), Some(1), Some("25:61")).is_err());
        assert!(Schedule::from_parts("yearly", None, None, None).is_err());
    }
}
