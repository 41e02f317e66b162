// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job_message::JobMessage;
use crate::infrastructure::database::entities::job_queue as queue_entity;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, Utc};
use sea_orm::{
    sea_query::{Expr, LockBehavior, LockType},
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbBackend, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

/// 队列错误类型
#[derive(Error, Debug)]
pub enum QueueError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Redis错误
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// 消息无法解析
    #[error("Malformed message: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 投递凭据无效
    #[error("Invalid delivery receipt: {0}")]
    InvalidReceipt(String),
}

/// 一次消息投递
///
/// 确认（ack）之前消息不会从队列中删除，进程崩溃后会被重新投递。
#[derive(Debug, Clone)]
pub struct Delivery {
    /// 队列后端用来确认或释放消息的凭据
    pub receipt: String,
    /// 消息内容
    pub message: JobMessage,
    /// 第几次投递（从 1 开始）
    pub delivery_count: u32,
}

/// 任务队列特质
///
/// 至少一次投递语义
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// 入队消息
    async fn enqueue(&self, message: &JobMessage) -> Result<(), QueueError>;

    /// 取出下一条消息
    async fn dequeue(&self, worker_id: Uuid) -> Result<Option<Delivery>, QueueError>;

    /// 确认消息已处理完成
    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError>;

    /// 放弃处理，消息可立即被重新投递
    async fn release(&self, delivery: &Delivery) -> Result<(), QueueError>;
}

/// PostgreSQL任务队列实现
///
/// 出队时以 `FOR UPDATE SKIP LOCKED` 租用最早的可见消息，租约到期后消息重新可见。
pub struct PostgresJobQueue {
    db: Arc<DatabaseConnection>,
    queue_name: String,
    lease: Duration,
}

impl PostgresJobQueue {
    /// 创建新的PostgreSQL任务队列实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    /// * `queue_name` - 队列名称
    /// * `lease` - 租约时长
    pub fn new(db: Arc<DatabaseConnection>, queue_name: impl Into<String>, lease: Duration) -> Self {
        Self {
            db,
            queue_name: queue_name.into(),
            lease,
        }
    }

    fn receipt_id(delivery: &Delivery) -> Result<Uuid, QueueError> {
        Uuid::parse_str(&delivery.receipt)
            .map_err(|_| QueueError::InvalidReceipt(delivery.receipt.clone()))
    }
}

#[async_trait]
impl JobQueue for PostgresJobQueue {
    async fn enqueue(&self, message: &JobMessage) -> Result<(), QueueError> {
        let model = queue_entity::ActiveModel {
            id: Set(Uuid::new_v4()),
            queue_name: Set(self.queue_name.clone()),
            payload: Set(serde_json::to_value(message)?),
            delivery_count: Set(0),
            locked_by: Set(None),
            locked_until: Set(None),
            created_at: Set(Utc::now().into()),
        };
        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn dequeue(&self, worker_id: Uuid) -> Result<Option<Delivery>, QueueError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let txn = self.db.begin().await?;

        let mut select = queue_entity::Entity::find()
            .filter(queue_entity::Column::QueueName.eq(self.queue_name.as_str()))
            .filter(
                Condition::any()
                    .add(queue_entity::Column::LockedUntil.is_null())
                    .add(queue_entity::Column::LockedUntil.lte(now)),
            )
            .order_by_asc(queue_entity::Column::CreatedAt);
        // SQLite has no row locks; its single writer serializes the lease
        if txn.get_database_backend() == DbBackend::Postgres {
            select = select.lock_with_behavior(LockType::Update, LockBehavior::SkipLocked);
        }
        let row = select.one(&txn).await?;

        let Some(row) = row else {
            txn.commit().await?;
            return Ok(None);
        };

        let lease = ChronoDuration::from_std(self.lease).unwrap_or(ChronoDuration::minutes(15));
        let delivery_count = row.delivery_count + 1;
        let payload = row.payload.clone();
        let mut active: queue_entity::ActiveModel = row.into();
        active.delivery_count = Set(delivery_count);
        active.locked_by = Set(Some(worker_id));
        active.locked_until = Set(Some(now + lease));
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        match serde_json::from_value::<JobMessage>(payload) {
            Ok(message) => Ok(Some(Delivery {
                receipt: updated.id.to_string(),
                message,
                delivery_count: u32::try_from(delivery_count).unwrap_or(u32::MAX),
            })),
            Err(e) => {
                warn!(message_id = %updated.id, error = %e, "Dropping malformed queue message");
                queue_entity::Entity::delete_by_id(updated.id)
                    .exec(self.db.as_ref())
                    .await?;
                Err(e.into())
            }
        }
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError> {
        let id = Self::receipt_id(delivery)?;
        queue_entity::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn release(&self, delivery: &Delivery) -> Result<(), QueueError> {
        let id = Self::receipt_id(delivery)?;
        queue_entity::Entity::update_many()
            .col_expr(queue_entity::Column::LockedBy, Expr::value(Option::<Uuid>::None))
            .col_expr(
                queue_entity::Column::LockedUntil,
                Expr::value(Option::<DateTime<FixedOffset>>::None),
            )
            .filter(queue_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }
}
