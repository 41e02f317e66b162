// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::finding::BrokenLinkFinding;
use crate::domain::repositories::job_repository::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 断链记录仓库特质
#[async_trait]
pub trait FindingRepository: Send + Sync {
    /// 插入一条断链记录
    ///
    /// 以 (job_id, broken_url, source_url) 为键幂等写入。
    ///
    /// # 返回值
    ///
    /// * `Ok(true)` - 新写入
    /// * `Ok(false)` - 记录已存在
    async fn insert_finding(&self, finding: &BrokenLinkFinding) -> Result<bool, RepositoryError>;

    /// 查询某任务的全部断链记录
    async fn find_by_job(&self, job_id: Uuid) -> Result<Vec<BrokenLinkFinding>, RepositoryError>;

    /// 统计某任务的断链记录数
    async fn count_by_job(&self, job_id: Uuid) -> Result<u64, RepositoryError>;

    /// 写入断链记录并把任务标记为完成
    ///
    /// 两步在同一个事务中提交，读者不会看到 `completed` 状态而记录尚未写全。
    /// `result_count` 取该任务已持久化的记录总数。
    ///
    /// # 返回值
    ///
    /// * `Ok(u64)` - 写入后的记录总数
    /// * `Err(RepositoryError)` - 任何一步失败，事务回滚
    async fn persist_and_complete(
        &self,
        job_id: Uuid,
        findings: &[BrokenLinkFinding],
    ) -> Result<u64, RepositoryError>;
}

