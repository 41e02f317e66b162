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

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// 页面抓取错误
///
/// 都是可恢复的：该页面被跳过，任务继续。
#[derive(Error, Debug)]
pub enum CrawlError {
    /// 网络错误（连接失败、DNS 失败等）
    #[error("Request failed: {0}")]
    Transport(String),
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 非成功状态码
    #[error("Unexpected status {0}")]
    Status(u16),
    /// 响应不是 HTML
    #[error("Not an HTML document: {0}")]
    NotHtml(String),
    /// 页面地址无法解析
    #[error("Invalid page URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for CrawlError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CrawlError::Timeout
        } else if let Some(status) = e.status() {
            CrawlError::Status(status.as_u16())
        } else {
            CrawlError::Transport(e.to_string())
        }
    }
}

/// 链接探测错误
///
/// 探测没有得到可分类的结果，例如超过重定向上限。调用方按“未失效”处理。
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Too many redirects")]
    TooManyRedirects,
    #[error("Invalid link URL: {0}")]
    InvalidUrl(String),
    #[error("Probe failed: {0}")]
    Request(String),
}

/// 抓取到的页面
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP状态码
    pub status_code: u16,
    /// 内容类型
    pub content_type: Option<String>,
    /// 响应内容
    pub body: String,
}

/// 一次探测的原始结果，分类由链接检查器完成
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 收到了响应（重定向之后的最终状态码）
    Response(u16),
    /// DNS 解析失败或连接被拒绝
    Unreachable(String),
    /// 超时
    TimedOut,
}

/// 页面抓取引擎特质
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 抓取页面 HTML
    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, CrawlError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}

/// 链接探测引擎特质
#[async_trait]
pub trait LinkProber: Send + Sync {
    /// 发送不带响应体的探测请求
    async fn probe(&self, url: &Url) -> Result<ProbeOutcome, ProbeError>;
}
