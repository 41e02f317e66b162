// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::finding::BrokenLinkFinding;
use crate::domain::repositories::finding_repository::FindingRepository;
use crate::domain::repositories::job_repository::RepositoryError;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// 断链结果汇总器
///
/// 把一次任务执行中发现的断链写入仓库并完成任务。
pub struct FindingAggregator {
    repository: Arc<dyn FindingRepository>,
}

impl FindingAggregator {
    pub fn new(repository: Arc<dyn FindingRepository>) -> Self {
        Self { repository }
    }

    /// 持久化断链记录并把任务标记为完成
    ///
    /// # 参数
    ///
    /// * `job_id` - 任务ID
    /// * `findings` - 本次执行的断链记录，可能含重复键
    ///
    /// # 返回值
    ///
    /// * `Ok(u64)` - 任务的最终结果数
    /// * `Err(RepositoryError)` - 写入失败，任务结果不可信
    pub async fn persist(
        &self,
        job_id: Uuid,
        findings: Vec<BrokenLinkFinding>,
    ) -> Result<u64, RepositoryError> {
        let unique = dedup_findings(job_id, findings);
        debug!(job_id = %job_id, findings = unique.len(), "Persisting findings");
        self.repository.persist_and_complete(job_id, &unique).await
    }
}

/// 按 (job_id, broken_url, source_url) 去重，保留首次出现的记录
///
/// 不属于该任务的记录会被丢弃。
pub fn dedup_findings(job_id: Uuid, findings: Vec<BrokenLinkFinding>) -> Vec<BrokenLinkFinding> {
    let mut seen = HashSet::new();
    findings
        .into_iter()
        .filter(|f| f.job_id == job_id)
        .filter(|f| {
            let (job, broken, source) = f.key();
            seen.insert((job, broken.to_owned(), source.to_owned()))
        })
        .collect()
}
