// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::job::Job;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// 输入队列消息
///
/// 由任务提交方（鉴权、扣费之后）写入队列，字段名与提交方保持一致。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JobMessage {
    pub job_id: Uuid,
    #[validate(length(min = 1, max = 512), custom(function = "validate_not_blank"))]
    pub keyword: String,
    #[validate(length(min = 1, max = 16), custom(function = "validate_not_blank"))]
    pub region: String,
    pub user_id: Uuid,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

impl From<&Job> for JobMessage {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id,
            keyword: job.keyword.clone(),
            region: job.region.clone(),
            user_id: job.user_id,
        }
    }
}
