// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 备份流水线模块
///
/// 实现一次备份的三个阶段以及配套的访问校验：
/// - 源获取（fetcher）：浅克隆远端仓库到临时目录
/// - 归档生成（archiver）：按配置格式产出单个备份产物
/// - 保留清理（retention）：删除超出保留数量的旧备份
/// - 访问校验（verify）：录入前验证GitHub仓库可达性
pub mod archiver;
pub mod fetcher;
pub mod retention;
pub mod verify;

use thiserror::Error;

/// 备份流水线错误类型
///
/// Authentication/Fetch/Archive会终止流水线并记录在任务上；
/// Retention在产物已生成后发生，只记录日志，不改变任务结果。
#[derive(Error, Debug)]
pub enum BackupError {
    /// 凭证缺失或无效，无法访问私有仓库
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// 源不可达、不存在或超时
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// 产出备份产物时的I/O失败
    #[error("Archive error: {0}")]
    Archive(String),

    /// 清理旧备份失败，非致命
    #[error("Retention error: {0}")]
    Retention(String),
}
