// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 域名过滤（domain_filter）：排除大型平台
/// - 候选页面获取（result_set_fetcher）：查询服务商并得到去重保序的候选页面
/// - 页面爬取（page_crawler）：抓取页面并提取外部链接
/// - 链接检查（link_status_checker）：探测链接并分类
/// - 结果汇总（finding_aggregator）：持久化断链并完成任务
pub mod domain_filter;
pub mod finding_aggregator;
pub mod link_status_checker;
pub mod page_crawler;
pub mod result_set_fetcher;
