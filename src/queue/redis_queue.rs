// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job_message::JobMessage;
use crate::infrastructure::redis_client::RedisClient;
use crate::queue::job_queue::{Delivery, JobQueue, QueueError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// 队列中实际存储的消息
///
/// 附加唯一ID，使 LREM 只命中这一条消息
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    id: Uuid,
    message: JobMessage,
}

/// Redis可靠列表队列
///
/// 出队时用 LMOVE 把消息从 pending 移到 processing，确认时从 processing 删除。
/// Redis 不记录投递次数，`delivery_count` 固定为 1。
pub struct RedisJobQueue {
    client: RedisClient,
    pending_key: String,
    processing_key: String,
}

impl RedisJobQueue {
    pub fn new(client: RedisClient, queue_name: &str) -> Self {
        Self {
            client,
            pending_key: format!("linklazarus:{}:pending", queue_name),
            processing_key: format!("linklazarus:{}:processing", queue_name),
        }
    }

    /// 把上次进程退出时遗留在 processing 中的消息放回 pending
    ///
    /// 只能在同一队列没有其他消费者运行时调用。
    pub async fn recover_inflight(&self) -> Result<usize, QueueError> {
        let mut recovered = 0;
        while self
            .client
            .lmove_left_to_right(&self.processing_key, &self.pending_key)
            .await?
            .is_some()
        {
            recovered += 1;
        }
        if recovered > 0 {
            info!(recovered, "Recovered in-flight queue messages");
        }
        Ok(recovered)
    }
}

fn encode(message: &JobMessage) -> Result<String, QueueError> {
    let envelope = Envelope {
        id: Uuid::new_v4(),
        message: message.clone(),
    };
    Ok(serde_json::to_string(&envelope)?)
}

#[async_trait]
impl JobQueue for RedisJobQueue {
    async fn enqueue(&self, message: &JobMessage) -> Result<(), QueueError> {
        let raw = encode(message)?;
        self.client.lpush(&self.pending_key, &raw).await?;
        Ok(())
    }

    async fn dequeue(&self, _worker_id: Uuid) -> Result<Option<Delivery>, QueueError> {
        let Some(raw) = self
            .client
            .lmove_right_to_left(&self.pending_key, &self.processing_key)
            .await?
        else {
            return Ok(None);
        };

        match serde_json::from_str::<Envelope>(&raw) {
            Ok(envelope) => Ok(Some(Delivery {
                receipt: raw,
                message: envelope.message,
                delivery_count: 1,
            })),
            Err(e) => {
                warn!(error = %e, "Dropping malformed queue message");
                self.client.lrem_one(&self.processing_key, &raw).await?;
                Err(e.into())
            }
        }
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError> {
        let removed = self
            .client
            .lrem_one(&self.processing_key, &delivery.receipt)
            .await?;
        if removed == 0 {
            warn!(job_id = %delivery.message.job_id, "Acked message was not in processing list");
        }
        Ok(())
    }

    async fn release(&self, delivery: &Delivery) -> Result<(), QueueError> {
        self.client
            .requeue(&self.processing_key, &self.pending_key, &delivery.receipt)
            .await?;
        Ok(())
    }
}
