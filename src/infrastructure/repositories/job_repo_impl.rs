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

use crate::domain::models::job::{Job, JobStatus};
use crate::domain::repositories::job_repository::{JobRepository, RepositoryError};
use crate::infrastructure::database::entities::job as job_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 任务仓库实现
///
/// 基于SeaORM实现的任务数据访问层
#[derive(Clone)]
pub struct JobRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl JobRepositoryImpl {
    /// 创建新的任务仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<job_entity::Model> for Job {
    fn from(model: job_entity::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            keyword: model.keyword,
            region: model.region,
            status: model.status.parse().unwrap_or_default(),
            result_count: model.result_count,
            error_message: model.error_message,
            created_at: model.created_at,
            started_at: model.started_at,
            completed_at: model.completed_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Job> for job_entity::ActiveModel {
    fn from(job: &Job) -> Self {
        Self {
            id: Set(job.id),
            user_id: Set(job.user_id),
            keyword: Set(job.keyword.clone()),
            region: Set(job.region.clone()),
            status: Set(job.status.to_string()),
            result_count: Set(job.result_count),
            error_message: Set(job.error_message.clone()),
            created_at: Set(job.created_at),
            started_at: Set(job.started_at),
            completed_at: Set(job.completed_at),
            updated_at: Set(job.updated_at),
        }
    }
}

/// 条件状态更新
///
/// 只有当前状态属于 `status` 的前驱时才会更新，返回受影响的行数。
/// 可在事务中调用。
pub(crate) async fn guarded_status_update<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    status: JobStatus,
    result_count: Option<i32>,
    error_message: Option<String>,
) -> Result<u64, DbErr> {
    let now: DateTime<FixedOffset> = Utc::now().into();
    let predecessors: Vec<String> = status
        .predecessors()
        .iter()
        .map(ToString::to_string)
        .collect();

    let mut update = job_entity::Entity::update_many()
        .col_expr(job_entity::Column::Status, Expr::value(status.to_string()))
        .col_expr(job_entity::Column::UpdatedAt, Expr::value(now));

    match status {
        JobStatus::Processing => {
            update = update.col_expr(job_entity::Column::StartedAt, Expr::value(Some(now)));
        }
        JobStatus::Completed | JobStatus::Failed => {
            update = update.col_expr(job_entity::Column::CompletedAt, Expr::value(Some(now)));
        }
        JobStatus::Pending => {}
    }
    if let Some(count) = result_count {
        update = update.col_expr(job_entity::Column::ResultCount, Expr::value(count));
    }
    if let Some(message) = error_message {
        update = update.col_expr(job_entity::Column::ErrorMessage, Expr::value(Some(message)));
    }

    let result = update
        .filter(job_entity::Column::Id.eq(id))
        .filter(job_entity::Column::Status.is_in(predecessors))
        .exec(conn)
        .await?;

    Ok(result.rows_affected)
}

/// 条件更新没有命中时，区分任务不存在与状态不合法
pub(crate) async fn transition_error<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    to: JobStatus,
) -> RepositoryError {
    match job_entity::Entity::find_by_id(id).one(conn).await {
        Ok(Some(model)) => RepositoryError::InvalidTransition {
            job_id: id,
            from: model.status.parse().unwrap_or_default(),
            to,
        },
        Ok(None) => RepositoryError::NotFound,
        Err(e) => RepositoryError::Database(e),
    }
}

#[async_trait]
impl JobRepository for JobRepositoryImpl {
    async fn create(&self, job: &Job) -> Result<Job, RepositoryError> {
        let model: job_entity::ActiveModel = job.into();
        let inserted = model.insert(self.db.as_ref()).await?;
        Ok(inserted.into())
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<Job>, RepositoryError> {
        let model = job_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn update_job_status(
        &self,
        id: Uuid,
        status: JobStatus,
        result_count: Option<i32>,
        error_message: Option<String>,
    ) -> Result<Job, RepositoryError> {
        let affected =
            guarded_status_update(self.db.as_ref(), id, status, result_count, error_message)
                .await?;

        if affected == 0 {
            return Err(transition_error(self.db.as_ref(), id, status).await);
        }

        self.get_job(id).await?.ok_or(RepositoryError::NotFound)
    }
}
