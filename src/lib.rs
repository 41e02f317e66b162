// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体、服务和仓库接口
pub mod domain;

/// 引擎模块
///
/// 页面抓取与链接探测的HTTP实现
pub mod engines;

/// 基础设施模块
///
/// 数据库、搜索结果服务商、Redis与指标
pub mod infrastructure;

/// 表示层模块
///
/// 工作进程的健康检查路由
pub mod presentation;

/// 队列模块
///
/// 至少一次投递的任务队列
pub mod queue;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 任务编排和后台工作循环
pub mod workers;
