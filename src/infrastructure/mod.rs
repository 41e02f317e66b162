// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 包含系统与外部服务交互的技术实现：
/// - 数据库（database）：连接、迁移与实体映射
/// - 指标（metrics）：Prometheus 导出与流水线计数
/// - Redis客户端（redis_client）：Redis 队列使用的列表操作
/// - 仓库实现（repositories）：领域仓库接口的数据库实现
/// - 搜索结果服务商（serp）：DataForSEO 客户端
pub mod database;
pub mod metrics;
pub mod redis_client;
pub mod repositories;
pub mod serp;
