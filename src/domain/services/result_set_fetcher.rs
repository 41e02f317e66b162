// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::region::{RegionParams, RegionTable};
use crate::domain::models::serp::SerpResponse;
use crate::domain::search::provider::{SerpError, SerpProvider, SerpQuery};
use crate::domain::services::domain_filter::DomainFilter;
use crate::utils::url_utils::normalize_for_dedup;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// 候选页面获取器
///
/// 向搜索结果服务商查询关键词，把嵌套的结果展开成去重、保序、
/// 经过域名过滤的候选页面列表。
pub struct ResultSetFetcher {
    provider: Arc<dyn SerpProvider>,
    regions: RegionTable,
    filter: Arc<DomainFilter>,
    depth: usize,
}

impl ResultSetFetcher {
    /// 创建候选页面获取器
    ///
    /// # 参数
    ///
    /// * `provider` - 搜索结果服务商
    /// * `regions` - 地区查找表
    /// * `filter` - 域名过滤器
    /// * `depth` - 请求深度，也是输出上限
    pub fn new(
        provider: Arc<dyn SerpProvider>,
        regions: RegionTable,
        filter: Arc<DomainFilter>,
        depth: usize,
    ) -> Self {
        Self {
            provider,
            regions,
            filter,
            depth,
        }
    }

    /// 校验输入并解析地区参数
    ///
    /// 编排器在把任务推进到 `processing` 之前调用，非法输入不会进入处理。
    pub fn resolve(&self, keyword: &str, region: &str) -> Result<RegionParams, SerpError> {
        if keyword.trim().is_empty() {
            return Err(SerpError::EmptyKeyword);
        }
        self.regions
            .lookup(region)
            .cloned()
            .ok_or_else(|| SerpError::UnknownRegion(region.to_string()))
    }

    /// 获取候选页面
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<String>)` - 按首次出现顺序排列的候选地址
    /// * `Err(SerpError)` - 输入非法或服务商调用失败
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn fetch(&self, keyword: &str, region: &str) -> Result<Vec<String>, SerpError> {
        let params = self.resolve(keyword, region)?;
        let query = SerpQuery {
            keyword: keyword.trim().to_string(),
            location_code: params.location_code,
            language_code: params.language_code,
            depth: self.depth,
        };

        let response = self.provider.search(&query).await?;
        let candidates = collect_candidates(&response, &self.filter, self.depth);
        debug!(count = candidates.len(), "Collected candidate pages");
        Ok(candidates)
    }
}

/// 展开、过滤、去重并截断服务商结果
///
/// 去重键为规范化后的地址，输出保留首次出现时的原始字符串。
pub fn collect_candidates(
    response: &SerpResponse,
    filter: &DomainFilter,
    depth: usize,
) -> Vec<String> {
    let mut seen = HashSet::new();
    response
        .item_urls()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .filter(|url| filter.allows(url))
        .filter(|url| seen.insert(normalize_for_dedup(url)))
        .take(depth)
        .map(str::to_string)
        .collect()
}
