// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 备份仓库（repo）：一个已注册的备份目标及其调度和保留策略
/// - 备份任务（job）：对仓库的一次备份执行及其状态
///
/// 这些模型构成了系统的数据基础，定义了业务概念的
/// 结构和行为，是领域驱动设计的核心组成部分。
pub mod job;
pub mod repo;
