// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::finding::{LinkStatus, UNREACHABLE_STATUS_CODE};
use crate::engines::traits::{LinkProber, ProbeError, ProbeOutcome};
use std::sync::Arc;
use url::Url;

/// 链接状态检查器
pub struct LinkStatusChecker {
    prober: Arc<dyn LinkProber>,
}

impl LinkStatusChecker {
    pub fn new(prober: Arc<dyn LinkProber>) -> Self {
        Self { prober }
    }

    /// 探测并分类一个绝对地址
    ///
    /// # 返回值
    ///
    /// * `Ok(LinkStatus)` - 分类结果
    /// * `Err(ProbeError)` - 无法分类，调用方按未失效处理
    pub async fn check(&self, target_url: &str) -> Result<LinkStatus, ProbeError> {
        let url = Url::parse(target_url).map_err(|e| ProbeError::InvalidUrl(e.to_string()))?;
        let outcome = self.prober.probe(&url).await?;
        Ok(classify(&outcome))
    }
}

/// 探测结果分类
///
/// - 404/410 判定为失效，保留状态码
/// - 其他任何状态码（包括 5xx）判定为可用
/// - DNS 或连接失败判定为失效，状态码为 0
/// - 超时判定为可用
pub fn classify(outcome: &ProbeOutcome) -> LinkStatus {
    match outcome {
        ProbeOutcome::Response(status @ (404 | 410)) => LinkStatus::Broken(*status),
        ProbeOutcome::Response(_) => LinkStatus::Alive,
        ProbeOutcome::Unreachable(_) => LinkStatus::Broken(UNREACHABLE_STATUS_CODE),
        // TODO: confirm with product whether probe timeouts should count as broken
        ProbeOutcome::TimedOut => LinkStatus::Alive,
    }
}
