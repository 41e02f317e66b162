// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 输入任务队列的两种后端：数据库租约与 Redis 可靠列表
pub mod job_queue;
pub mod redis_queue;
