// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 注册仓库请求
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateRepoRequest {
    /// 所属用户ID
    pub user_id: Uuid,
    /// GitHub克隆地址
    #[validate(url)]
    pub url: String,
    /// 私有仓库访问令牌
    pub access_token: Option<String>,
    /// 归档格式：folder、zip或targz，默认folder
    pub format: Option<String>,
    /// 调度配置
    #[validate(nested)]
    pub schedule: ScheduleDto,
    /// 保留的备份数量
    #[validate(range(min = 1, max = 50))]
    pub retention_count: Option<i32>,
    /// 是否参与自动调度，默认true
    pub is_active: Option<bool>,
}

/// 调度配置
#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct ScheduleDto {
    /// 调度类型：manual、hourly、daily、weekly、monthly或custom
    pub kind: String,
    /// 自定义间隔单位：day、week或month
    pub interval_unit: Option<String>,
    /// 自定义间隔数量
    #[validate(range(min = 1, max = 365))]
    pub interval_count: Option<i32>,
    /// 自定义执行时刻，格式HH:MM
    pub run_at: Option<String>,
}

/// 更新仓库请求
///
/// 所有字段可选，缺省字段保持原值
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UpdateRepoRequest {
    /// 私有仓库访问令牌，传空字符串表示清除
    pub access_token: Option<String>,
    /// 归档格式
    pub format: Option<String>,
    /// 调度配置
    #[validate(nested)]
    pub schedule: Option<ScheduleDto>,
    /// 保留的备份数量
    #[validate(range(min = 1, max = 50))]
    pub retention_count: Option<i32>,
    /// 是否参与自动调度
    pub is_active: Option<bool>,
}

/// 校验仓库可达性请求
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct VerifyRepoRequest {
    /// GitHub克隆地址
    #[validate(url)]
    pub url: String,
    /// 私有仓库访问令牌
    pub access_token: Option<String>,
}
