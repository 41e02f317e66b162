// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：任务、链接、断链记录等实体
/// - 仓库接口（repositories）：数据持久化抽象接口
/// - 搜索（search）：搜索结果服务商接口
/// - 服务（services）：域名过滤、候选页面获取、页面爬取、链接检查与结果汇总
///
/// 领域层不依赖于任何外部实现。
pub mod models;
pub mod repositories;
pub mod search;
pub mod services;
