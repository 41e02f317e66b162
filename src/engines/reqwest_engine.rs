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

use crate::config::settings::HttpSettings;
use crate::engines::traits::{
    CrawlError, FetchedPage, LinkProber, PageFetcher, ProbeError, ProbeOutcome,
};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::Client;
use std::error::Error as StdError;
use std::io;
use tracing::debug;
use url::Url;

/// 抓取引擎
///
/// 基于reqwest实现。页面抓取和链接探测使用两个共享的客户端，
/// 各自带有独立的超时；探测客户端限制重定向次数。
#[derive(Clone)]
pub struct ReqwestEngine {
    page_client: Client,
    probe_client: Client,
}

impl ReqwestEngine {
    /// 根据HTTP配置创建引擎
    ///
    /// # 参数
    ///
    /// * `settings` - 出站HTTP配置
    ///
    /// # 返回值
    ///
    /// * `Ok(ReqwestEngine)` - 引擎实例
    /// * `Err(reqwest::Error)` - 客户端构建失败（例如 TLS 初始化失败）
    pub fn new(settings: &HttpSettings) -> Result<Self, reqwest::Error> {
        let page_client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.page_timeout())
            .build()?;

        let probe_client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.probe_timeout())
            .redirect(Policy::limited(settings.probe_max_redirects))
            .build()?;

        Ok(Self {
            page_client,
            probe_client,
        })
    }
}

#[async_trait]
impl PageFetcher for ReqwestEngine {
    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, CrawlError> {
        let response = self.page_client.get(url.clone()).send().await?;

        let status_code = response.status().as_u16();
        if !response.status().is_success() {
            return Err(CrawlError::Status(status_code));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        // A missing content type is parsed as HTML.
        if let Some(ct) = &content_type {
            if !ct.to_ascii_lowercase().contains("html") {
                return Err(CrawlError::NotHtml(ct.clone()));
            }
        }

        let body = response.text().await?;

        Ok(FetchedPage {
            status_code,
            content_type,
            body,
        })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[async_trait]
impl LinkProber for ReqwestEngine {
    async fn probe(&self, url: &Url) -> Result<ProbeOutcome, ProbeError> {
        match self.probe_client.head(url.clone()).send().await {
            Ok(response) => Ok(ProbeOutcome::Response(response.status().as_u16())),
            Err(e) => {
                debug!(url = %url, error = %e, "Probe request failed");
                if e.is_timeout() {
                    Ok(ProbeOutcome::TimedOut)
                } else if is_unreachable(&e) {
                    Ok(ProbeOutcome::Unreachable(e.to_string()))
                } else if e.is_redirect() {
                    Err(ProbeError::TooManyRedirects)
                } else {
                    Err(ProbeError::Request(e.to_string()))
                }
            }
        }
    }
}

/// 目标主机无法解析或拒绝连接
///
/// TLS 握手和证书错误同样发生在连接阶段，但不算作链接失效。
fn is_unreachable(error: &reqwest::Error) -> bool {
    if !error.is_connect() {
        return false;
    }

    let mut source = error.source();
    while let Some(cause) = source {
        if let Some(io_error) = cause.downcast_ref::<io::Error>() {
            if io_error.kind() == io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        // hyper-util reports resolver failures as "dns error"
        if cause.to_string().starts_with("dns error") {
            return true;
        }
        source = cause.source();
    }
    false
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
