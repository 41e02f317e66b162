// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 任务（job）：一次关键词 + 地区的断链查找请求及其状态机
/// - 队列消息（job_message）：输入队列中的任务描述
/// - 链接（link）：从候选页面中提取的外部链接
/// - 断链记录（finding）：持久化的断链结果及探测分类
/// - 地区（region）：地区编码到服务商参数的查找表
/// - 搜索结果（serp）：服务商返回的嵌套结构
pub mod finding;
pub mod job;
pub mod job_message;
pub mod link;
pub mod region;
pub mod serp;
