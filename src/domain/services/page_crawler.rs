// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::link::ExtractedLink;
use crate::domain::services::domain_filter::DomainFilter;
use crate::engines::traits::{CrawlError, PageFetcher};
use crate::utils::url_utils::{is_http, resolve_url};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// 页面爬取器
///
/// 抓取候选页面并提取其中指向其他主机的链接
pub struct PageCrawler {
    fetcher: Arc<dyn PageFetcher>,
    filter: Arc<DomainFilter>,
}

impl PageCrawler {
    /// 创建新的页面爬取器
    ///
    /// # 参数
    ///
    /// * `fetcher` - 页面抓取引擎
    /// * `filter` - 域名过滤器
    pub fn new(fetcher: Arc<dyn PageFetcher>, filter: Arc<DomainFilter>) -> Self {
        Self { fetcher, filter }
    }

    /// 爬取单个页面
    ///
    /// # 参数
    ///
    /// * `page_url` - 候选页面地址
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<ExtractedLink>)` - 去重后的外部链接
    /// * `Err(CrawlError)` - 页面抓取失败，调用方跳过该页面
    pub async fn crawl(&self, page_url: &str) -> Result<Vec<ExtractedLink>, CrawlError> {
        let url = Url::parse(page_url).map_err(|e| CrawlError::InvalidUrl(e.to_string()))?;
        let page = self.fetcher.fetch_page(&url).await?;
        Ok(extract_external_links(page_url, &url, &page.body, &self.filter))
    }
}

/// 从HTML内容中提取外部链接
///
/// 跳过空链接、仅片段链接和 `javascript:` 链接；相对地址按页面地址解析；
/// 只保留主机名与页面不同的 http/https 地址，并经过域名过滤。
/// 同一页面内重复的目标只保留第一次出现。
///
/// # 参数
///
/// * `source_url` - 写入记录的来源地址（原始字符串）
/// * `base` - 解析相对地址使用的页面地址
/// * `html_content` - HTML内容
/// * `filter` - 域名过滤器
pub fn extract_external_links(
    source_url: &str,
    base: &Url,
    html_content: &str,
    filter: &DomainFilter,
) -> Vec<ExtractedLink> {
    let document = Html::parse_document(html_content);
    let page_host = base.host_str().map(|h| h.to_ascii_lowercase());
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if href.is_empty()
            || href.starts_with('#')
            || href.to_ascii_lowercase().starts_with("javascript:")
        {
            continue;
        }

        let Ok(target) = resolve_url(base, href) else {
            continue;
        };
        if !is_http(&target) {
            continue;
        }

        let target_host = target.host_str().map(|h| h.to_ascii_lowercase());
        if target_host.is_none() || target_host == page_host {
            continue;
        }

        let target = target.to_string();
        if filter.is_blocked(&target) || !seen.insert(target.clone()) {
            continue;
        }

        let anchor_text = element.text().collect::<String>();
        links.push(ExtractedLink::new(source_url, target, &anchor_text));
    }

    links
}
