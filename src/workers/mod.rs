// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供备份任务的执行引擎
/// 包括到期派发、单仓库互斥和流水线执行
pub mod backup_worker;
pub mod executor;
