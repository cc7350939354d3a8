// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 调度模块
///
/// 实现到期评估与定时派发：
/// - 评估器（evaluator）：纯函数，判断仓库是否到期并给出下次执行时刻
/// - 调度器（scheduler）：定时循环，驱动执行器做到期评估
pub mod evaluator;
pub mod scheduler;
