// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 搜索结果服务商的响应体
///
/// 嵌套结构为 task → result → items，每个条目可能带有 URL。
/// 所有字段都允许缺失，缺失视为空。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SerpResponse {
    #[serde(default)]
    pub status_code: Option<i64>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub tasks: Option<Vec<SerpTask>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SerpTask {
    #[serde(default)]
    pub status_code: Option<i64>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub result: Option<Vec<SerpResult>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SerpResult {
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<SerpItem>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SerpItem {
    #[serde(default, rename = "type")]
    pub item_type: Option<String>,
    #[serde(default)]
    pub rank_absolute: Option<i64>,
    #[serde(default)]
    pub url: Option<String>,
}

impl SerpResponse {
    /// 展开所有任务的第一个结果中的条目 URL，保持原始顺序
    pub fn item_urls(&self) -> impl Iterator<Item = &str> {
        self.tasks
            .iter()
            .flatten()
            .filter_map(|task| task.result.as_ref().and_then(|results| results.first()))
            .flat_map(|result| result.items.iter().flatten())
            .filter_map(|item| item.url.as_deref())
    }
}
