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

use linklazarus::config::settings::{QueueBackend, Settings};
use linklazarus::domain::models::region::RegionTable;
use linklazarus::domain::services::domain_filter::DomainFilter;
use linklazarus::domain::services::finding_aggregator::FindingAggregator;
use linklazarus::domain::services::link_status_checker::LinkStatusChecker;
use linklazarus::domain::services::page_crawler::PageCrawler;
use linklazarus::domain::services::result_set_fetcher::ResultSetFetcher;
use linklazarus::engines::reqwest_engine::ReqwestEngine;
use linklazarus::infrastructure::database::connection;
use linklazarus::infrastructure::metrics;
use linklazarus::infrastructure::redis_client::RedisClient;
use linklazarus::infrastructure::repositories::finding_repo_impl::FindingRepositoryImpl;
use linklazarus::infrastructure::repositories::job_repo_impl::JobRepositoryImpl;
use linklazarus::infrastructure::serp::dataforseo::DataForSeoClient;
use linklazarus::presentation::routes;
use linklazarus::queue::job_queue::{JobQueue, PostgresJobQueue};
use linklazarus::queue::redis_queue::RedisJobQueue;
use linklazarus::utils::telemetry;
use linklazarus::workers::manager::WorkerManager;
use linklazarus::workers::orchestrator::{JobOrchestrator, OrchestratorConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// 关闭时等待工作进程释放任务的时间
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// 主函数
///
/// 工作进程入口点，负责构建所有客户端并注入到编排器中
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting linklazarus worker...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    metrics::init_metrics(&settings.metrics);

    // 3. Connect to database
    let db = Arc::new(connection::create_pool(&settings.database).await?);
    info!("Database connection established");

    if settings.database.run_migrations {
        info!("Running database migrations...");
        connection::run_migrations(db.as_ref()).await?;
        info!("Database migrations applied");
    }

    // 4. Queue backend
    let queue: Arc<dyn JobQueue> = match settings.queue.backend {
        QueueBackend::Postgres => Arc::new(PostgresJobQueue::new(
            db.clone(),
            settings.queue.name.clone(),
            Duration::from_secs(settings.queue.lease_seconds),
        )),
        QueueBackend::Redis => {
            let client = RedisClient::new(&settings.redis.url)?;
            client.ping().await?;
            let queue = RedisJobQueue::new(client, &settings.queue.name);
            queue.recover_inflight().await?;
            Arc::new(queue)
        }
    };
    info!(backend = ?settings.queue.backend, name = %settings.queue.name, "Job queue ready");

    // 5. Clients and services
    let engine = Arc::new(ReqwestEngine::new(&settings.http)?);
    let provider = Arc::new(DataForSeoClient::new(&settings.serp)?);
    let filter = Arc::new(DomainFilter::new(&settings.filter.blocked_domains));
    let regions = RegionTable::with_overrides(&settings.serp.regions);

    let orchestrator = Arc::new(JobOrchestrator::new(
        Arc::new(JobRepositoryImpl::new(db.clone())),
        Arc::new(ResultSetFetcher::new(
            provider,
            regions,
            filter.clone(),
            settings.serp.depth,
        )),
        Arc::new(PageCrawler::new(engine.clone(), filter)),
        Arc::new(LinkStatusChecker::new(engine)),
        Arc::new(FindingAggregator::new(Arc::new(FindingRepositoryImpl::new(
            db.clone(),
        )))),
        OrchestratorConfig::from(&settings.worker),
    ));

    // 6. Start workers
    let mut worker_manager = WorkerManager::new(
        queue,
        orchestrator,
        Duration::from_millis(settings.queue.poll_interval_ms),
    );
    worker_manager.start_workers(settings.worker.count);

    // 7. Health endpoint
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Health server listening on {}", addr);
    let app = routes::routes().layer(TraceLayer::new_for_http());
    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Health server error: {}", e);
        }
    });

    // 8. Wait for Ctrl-C
    worker_manager.wait_for_shutdown(SHUTDOWN_GRACE).await;
    server.abort();
    drop(worker_manager);

    if let Ok(db) = Arc::try_unwrap(db) {
        db.close().await?;
    }
    info!("linklazarus worker stopped");

    Ok(())
}
