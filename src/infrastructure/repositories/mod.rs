// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 提供领域仓库接口的具体实现
/// 包括备份目标与备份任务的数据库实现
pub mod job_repo_impl;
pub mod repo_repo_impl;
