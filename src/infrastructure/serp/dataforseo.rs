// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::SerpSettings;
use crate::domain::models::serp::SerpResponse;
use crate::domain::search::provider::{SerpError, SerpProvider, SerpQuery};
use crate::utils::retry_policy::RetryPolicy;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// 服务商业务状态码，大于等于该值表示请求被拒绝
const PROVIDER_ERROR_THRESHOLD: i64 = 40000;

#[derive(Debug, Serialize)]
struct LiveTask<'a> {
    keyword: &'a str,
    location_code: u32,
    language_code: &'a str,
    depth: usize,
}

/// DataForSEO 自然搜索结果客户端
///
/// 使用 Basic 认证向 live/advanced 接口提交单个任务。
/// 超时、连接失败、429 与 5xx 会按重试策略退避重试。
pub struct DataForSeoClient {
    client: Client,
    endpoint: String,
    login: String,
    password: String,
    retry: RetryPolicy,
}

impl DataForSeoClient {
    /// 创建客户端
    ///
    /// # 参数
    ///
    /// * `settings` - 服务商配置
    ///
    /// # 返回值
    ///
    /// * `Ok(DataForSeoClient)` - 客户端实例
    /// * `Err(reqwest::Error)` - HTTP客户端构建失败
    pub fn new(settings: &SerpSettings) -> Result<Self, reqwest::Error> {
        if settings.login.is_empty() || settings.password.is_empty() {
            warn!("SERP credentials are empty; provider calls will be rejected");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            login: settings.login.clone(),
            password: settings.password.clone(),
            retry: RetryPolicy::with_max_retries(settings.max_retries),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn search_once(&self, query: &SerpQuery) -> Result<SerpResponse, SerpError> {
        let body = [LiveTask {
            keyword: &query.keyword,
            location_code: query.location_code,
            language_code: &query.language_code,
            depth: query.depth,
        }];

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.login, Some(&self.password))
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SerpError::Status {
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(map_transport_error)?;
        let payload: SerpResponse =
            serde_json::from_str(&text).map_err(|e| SerpError::Malformed(e.to_string()))?;

        check_provider_status(&payload)?;
        Ok(payload)
    }
}

fn map_transport_error(e: reqwest::Error) -> SerpError {
    if e.is_timeout() {
        SerpError::Timeout
    } else {
        SerpError::Transport(e.to_string())
    }
}

/// 顶层状态码或所有任务的状态码表示失败时返回服务商错误
fn check_provider_status(payload: &SerpResponse) -> Result<(), SerpError> {
    if let Some(code) = payload.status_code.filter(|c| *c >= PROVIDER_ERROR_THRESHOLD) {
        return Err(SerpError::Provider {
            code,
            message: payload.status_message.clone().unwrap_or_default(),
        });
    }

    let tasks = payload.tasks.as_deref().unwrap_or_default();
    let all_failed = !tasks.is_empty()
        && tasks
            .iter()
            .all(|t| t.status_code.is_some_and(|c| c >= PROVIDER_ERROR_THRESHOLD));
    if all_failed {
        let first = &tasks[0];
        return Err(SerpError::Provider {
            code: first.status_code.unwrap_or_default(),
            message: first.status_message.clone().unwrap_or_default(),
        });
    }

    Ok(())
}

#[async_trait]
impl SerpProvider for DataForSeoClient {
    async fn search(&self, query: &SerpQuery) -> Result<SerpResponse, SerpError> {
        let mut attempt = 0;
        loop {
            match self.search_once(query).await {
                Ok(payload) => return Ok(payload),
                Err(e) if e.is_transient() && self.retry.should_retry(attempt) => {
                    attempt += 1;
                    let backoff = self.retry.calculate_backoff(attempt);
                    warn!(
                        error = %e,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        "SERP request failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    debug!(error = %e, attempt, "SERP request failed");
                    return Err(e);
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "dataforseo"
    }
}
