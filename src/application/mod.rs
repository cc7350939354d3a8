// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用层模块
///
/// 编排领域层完成具体的业务用例
/// 包含数据传输对象和用例实现
pub mod dto;
pub mod use_cases;
