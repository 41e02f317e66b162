// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::link::ExtractedLink;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 无法连接（DNS 解析失败或连接被拒绝）时使用的状态码
pub const UNREACHABLE_STATUS_CODE: u16 = 0;

/// 链接探测分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkStatus {
    /// 链接可用，不产生记录
    Alive,
    /// 链接失效，附带 404、410 或 0
    Broken(u16),
}

/// 断链记录
///
/// 每个 (job_id, broken_url, source_url) 组合只持久化一次，写入后不可变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenLinkFinding {
    pub id: Uuid,
    pub job_id: Uuid,
    pub source_url: String,
    pub broken_url: String,
    pub anchor_text: String,
    pub status_code: i32,
    pub created_at: DateTime<FixedOffset>,
}

impl BrokenLinkFinding {
    /// 根据提取的链接和探测状态码创建断链记录
    pub fn new(job_id: Uuid, link: &ExtractedLink, status_code: u16) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_id,
            source_url: link.source_url.clone(),
            broken_url: link.target_url.clone(),
            anchor_text: link.anchor_text.clone(),
            status_code: i32::from(status_code),
            created_at: Utc::now().into(),
        }
    }

    /// 去重键
    pub fn key(&self) -> (Uuid, &str, &str) {
        (self.job_id, self.broken_url.as_str(), self.source_url.as_str())
    }
}
