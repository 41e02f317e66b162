// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// 任务实体
///
/// 表示用户提交的一次断链查找请求（关键词 + 地区）。任务由外部提交方以
/// `pending` 状态创建，之后只由编排器修改，本系统从不删除任务。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// 任务唯一标识符
    pub id: Uuid,
    /// 所属用户ID
    pub user_id: Uuid,
    /// 搜索关键词，非空
    pub keyword: String,
    /// 地区编码
    pub region: String,
    /// 任务状态
    pub status: JobStatus,
    /// 已持久化的断链数量
    pub result_count: i32,
    /// 失败时保留的诊断信息
    pub error_message: Option<String>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 开始处理时间
    pub started_at: Option<DateTime<FixedOffset>>,
    /// 进入终态的时间
    pub completed_at: Option<DateTime<FixedOffset>>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}

/// 任务状态枚举
///
/// 状态只会向前推进：
/// Pending → Processing → Completed/Failed
///
/// `Processing → Processing` 用于崩溃后重新投递的任务重新执行，
/// `Pending → Failed` 用于在开始处理前就被拒绝的非法输入。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// 等待处理
    #[default]
    Pending,
    /// 处理中
    Processing,
    /// 已完成
    Completed,
    /// 已失败
    Failed,
}

impl JobStatus {
    /// 是否为终态
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// 允许转换到 `self` 的前驱状态
    pub fn predecessors(self) -> &'static [JobStatus] {
        match self {
            JobStatus::Pending => &[],
            JobStatus::Processing => &[JobStatus::Pending, JobStatus::Processing],
            JobStatus::Completed => &[JobStatus::Processing],
            JobStatus::Failed => &[JobStatus::Pending, JobStatus::Processing],
        }
    }

    /// 判断是否可以从当前状态转换到 `next`
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        next.predecessors().contains(&self)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(DomainError::ValidationError(format!(
                "unknown job status '{}'",
                other
            ))),
        }
    }
}

/// 任务失败原因
///
/// 任务以 `failed` 结束的全部原因，写入任务的 `error_message`。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobFailure {
    /// 输入不合法（空关键词、未知地区等），在进入处理前被拒绝
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// 搜索结果服务商调用失败，无法获得候选页面
    #[error("search results provider failed: {0}")]
    Provider(String),

    /// 结果持久化失败
    #[error("persistence failed: {0}")]
    Persistence(String),

    /// 超出任务时间预算
    #[error("job exceeded its time budget of {}s", .0.as_secs())]
    Timeout(Duration),
}

/// 领域错误类型
#[derive(Error, Debug)]
pub enum DomainError {
    /// 无效的状态转换
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: JobStatus, to: JobStatus },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl Job {
    /// 创建一个新的待处理任务
    ///
    /// # 参数
    ///
    /// * `user_id` - 所属用户ID
    /// * `keyword` - 搜索关键词
    /// * `region` - 地区编码
    ///
    /// # 返回值
    ///
    /// 返回状态为 `pending` 的新任务
    pub fn new(user_id: Uuid, keyword: impl Into<String>, region: impl Into<String>) -> Self {
        let now: DateTime<FixedOffset> = Utc::now().into();
        Self {
            id: Uuid::new_v4(),
            user_id,
            keyword: keyword.into(),
            region: region.into(),
            status: JobStatus::Pending,
            result_count: 0,
            error_message: None,
            created_at: now,
            started_at: None,
            completed_at: None,
            updated_at: now,
        }
    }

    /// 将任务推进到 `next` 状态
    ///
    /// 只有合法的前驱状态才能转换，终态不会被离开。
    pub fn transition(
        &mut self,
        next: JobStatus,
        result_count: Option<i32>,
        error_message: Option<String>,
    ) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidStateTransition {
                from: self.status,
                to: next,
            });
        }

        let now: DateTime<FixedOffset> = Utc::now().into();
        match next {
            JobStatus::Processing => {
                self.started_at = Some(now);
            }
            JobStatus::Completed | JobStatus::Failed => {
                self.completed_at = Some(now);
            }
            JobStatus::Pending => {}
        }
        if let Some(count) = result_count {
            self.result_count = count;
        }
        if error_message.is_some() {
            self.error_message = error_message;
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}
