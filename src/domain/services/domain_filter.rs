// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::DEFAULT_BLOCKED_DOMAINS;
use crate::utils::url_utils::host_of;

/// 域名过滤器
///
/// 静态屏蔽列表，启动时构建，运行期间只读。
/// 主机名包含任一屏蔽子串的地址会被排除；无法解析主机名时对整个地址做子串匹配。
#[derive(Debug, Clone)]
pub struct DomainFilter {
    blocked: Vec<String>,
}

impl DomainFilter {
    pub fn new<I, S>(blocked: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let blocked = blocked
            .into_iter()
            .map(|d| d.as_ref().trim().to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self { blocked }
    }

    /// 地址是否被屏蔽
    pub fn is_blocked(&self, url: &str) -> bool {
        let haystack = host_of(url).unwrap_or_else(|| url.to_ascii_lowercase());
        self.blocked.iter().any(|domain| haystack.contains(domain.as_str()))
    }

    pub fn allows(&self, url: &str) -> bool {
        !self.is_blocked(url)
    }
}

impl Default for DomainFilter {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCKED_DOMAINS)
    }
}
