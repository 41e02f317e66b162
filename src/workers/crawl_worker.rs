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

use crate::domain::repositories::job_repository::RepositoryError;
use crate::queue::job_queue::{Delivery, JobQueue, QueueError};
use crate::utils::errors::WorkerError;
use crate::workers::orchestrator::{JobOrchestrator, JobOutcome};
use crate::workers::worker::Worker;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 爬取工作者
///
/// 从队列取出任务消息交给编排器，任务进入终态后确认消息，
/// 其余情况释放消息等待重新投递。
pub struct CrawlWorker {
    worker_id: Uuid,
    name: String,
    queue: Arc<dyn JobQueue>,
    orchestrator: Arc<JobOrchestrator>,
    poll_interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl CrawlWorker {
    /// 创建新的爬取工作者
    ///
    /// # 参数
    ///
    /// * `queue` - 输入队列
    /// * `orchestrator` - 任务编排器
    /// * `poll_interval` - 队列为空时的等待时间
    /// * `shutdown` - 关闭信号，值变为 `true` 或发送端被丢弃时停止
    pub fn new(
        queue: Arc<dyn JobQueue>,
        orchestrator: Arc<JobOrchestrator>,
        poll_interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let worker_id = Uuid::new_v4();
        Self {
            worker_id,
            name: format!("crawl-worker-{}", worker_id),
            queue,
            orchestrator,
            poll_interval,
            shutdown,
        }
    }

    /// 等待下一次轮询，收到关闭信号时返回 `true`
    async fn idle(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        tokio::select! {
            _ = sleep(self.poll_interval) => false,
            _ = shutdown.changed() => true,
        }
    }

    async fn settle(&self, delivery: &Delivery, result: Result<JobOutcome, RepositoryError>) {
        match result {
            Ok(outcome) => {
                debug!(job_id = %delivery.message.job_id, ?outcome, "Acknowledging message");
                if let Err(e) = self.queue.ack(delivery).await {
                    error!(job_id = %delivery.message.job_id, error = %e, "Failed to acknowledge message");
                }
            }
            Err(e) => {
                error!(
                    job_id = %delivery.message.job_id,
                    error = %e,
                    "Could not record job outcome, releasing message"
                );
                if let Err(e) = self.queue.release(delivery).await {
                    error!(job_id = %delivery.message.job_id, error = %e, "Failed to release message");
                }
            }
        }
    }
}

#[async_trait]
impl Worker for CrawlWorker {
    async fn run(&self) -> Result<(), WorkerError> {
        let mut shutdown = self.shutdown.clone();
        info!("Crawl worker {} started", self.worker_id);

        while !*shutdown.borrow() {
            let delivery = match self.queue.dequeue(self.worker_id).await {
                Ok(Some(delivery)) => delivery,
                Ok(None) => {
                    if self.idle(&mut shutdown).await {
                        break;
                    }
                    continue;
                }
                Err(QueueError::Serialization(e)) => {
                    warn!(error = %e, "Discarded malformed queue message");
                    continue;
                }
                Err(e) => {
                    error!("Error dequeuing job: {}", e);
                    if self.idle(&mut shutdown).await {
                        break;
                    }
                    continue;
                }
            };

            if delivery.delivery_count > 1 {
                info!(
                    job_id = %delivery.message.job_id,
                    delivery_count = delivery.delivery_count,
                    "Processing redelivered message"
                );
            }

            tokio::select! {
                result = self.orchestrator.process(&delivery.message) => {
                    self.settle(&delivery, result).await;
                }
                _ = shutdown.changed() => {
                    info!(job_id = %delivery.message.job_id, "Shutdown requested, releasing in-flight job");
                    self.queue.release(&delivery).await?;
                    break;
                }
            }
        }

        info!("Crawl worker {} stopped", self.worker_id);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
