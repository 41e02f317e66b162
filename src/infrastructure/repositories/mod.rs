// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 任务与断链记录仓库的 sea-orm 实现
pub mod finding_repo_impl;
pub mod job_repo_impl;
