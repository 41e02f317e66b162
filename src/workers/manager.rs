// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::queue::job_queue::JobQueue;
use crate::workers::crawl_worker::CrawlWorker;
use crate::workers::orchestrator::JobOrchestrator;
use crate::workers::worker::Worker;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// 工作管理器
///
/// 启动多个爬取工作者并负责它们的关闭
pub struct WorkerManager {
    queue: Arc<dyn JobQueue>,
    orchestrator: Arc<JobOrchestrator>,
    poll_interval: Duration,
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerManager {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        orchestrator: Arc<JobOrchestrator>,
        poll_interval: Duration,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            queue,
            orchestrator,
            poll_interval,
            shutdown_tx,
            handles: Vec::new(),
        }
    }

    /// 启动工作进程
    ///
    /// # 参数
    ///
    /// * `count` - 要启动的工作进程数量
    pub fn start_workers(&mut self, count: usize) {
        for _ in 0..count {
            let worker = CrawlWorker::new(
                self.queue.clone(),
                self.orchestrator.clone(),
                self.poll_interval,
                self.shutdown_tx.subscribe(),
            );

            let handle = tokio::spawn(async move {
                if let Err(e) = worker.run().await {
                    error!("Worker {} exited with error: {}", worker.name(), e);
                }
            });
            self.handles.push(handle);
        }
        info!("Started {} crawl workers", count);
    }

    /// 正在运行的工作进程数量
    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// 通知所有工作进程停止并等待它们退出
    ///
    /// 正在处理的任务消息会被释放，超过 `grace` 仍未退出的工作进程被中止。
    pub async fn shutdown(&mut self, grace: Duration) {
        info!("Shutting down workers...");
        self.shutdown_tx.send_replace(true);

        for mut handle in self.handles.drain(..) {
            match tokio::time::timeout(grace, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Worker task failed: {}", e),
                Err(_) => {
                    warn!("Worker did not stop within {:?}, aborting", grace);
                    handle.abort();
                }
            }
        }

        info!("Workers shut down successfully");
    }

    /// 等待 Ctrl-C 后关闭工作进程
    pub async fn wait_for_shutdown(&mut self, grace: Duration) {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        }

        self.shutdown(grace).await;
    }
}
