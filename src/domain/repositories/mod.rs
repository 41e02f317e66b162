// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 任务仓库（job_repository）：读取任务并执行受保护的状态转换
/// - 断链仓库（finding_repository）：幂等写入断链记录，并与任务完成状态原子提交
pub mod finding_repository;
pub mod job_repository;
