// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::{Job, JobStatus};
use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 当前状态不允许转换到目标状态
    #[error("Job {job_id} cannot move from {from} to {to}")]
    InvalidTransition {
        job_id: Uuid,
        from: JobStatus,
        to: JobStatus,
    },
}

/// 任务仓库特质
///
/// 编排器对任务存储的全部需求
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// 创建新任务（由提交方使用，测试中也用于准备数据）
    async fn create(&self, job: &Job) -> Result<Job, RepositoryError>;

    /// 根据ID查找任务
    async fn get_job(&self, id: Uuid) -> Result<Option<Job>, RepositoryError>;

    /// 受保护的状态更新
    ///
    /// 只有当任务处于 `status` 的合法前驱状态时才会写入，
    /// 否则返回 `InvalidTransition`，任务不存在时返回 `NotFound`。
    ///
    /// # 参数
    ///
    /// * `id` - 任务ID
    /// * `status` - 目标状态
    /// * `result_count` - 可选的结果数量
    /// * `error_message` - 可选的失败诊断信息
    async fn update_job_status(
        &self,
        id: Uuid,
        status: JobStatus,
        result_count: Option<i32>,
        error_message: Option<String>,
    ) -> Result<Job, RepositoryError>;
}

