// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{http::StatusCode, response::Html, routing::get, Router};
use linklazarus::config::settings::{HttpSettings, SerpSettings, WorkerSettings};
use linklazarus::domain::models::job::Job;
use linklazarus::domain::models::job_message::JobMessage;
use linklazarus::domain::models::region::RegionTable;
use linklazarus::domain::repositories::job_repository::JobRepository;
use linklazarus::domain::services::domain_filter::DomainFilter;
use linklazarus::domain::services::finding_aggregator::FindingAggregator;
use linklazarus::domain::services::link_status_checker::LinkStatusChecker;
use linklazarus::domain::services::page_crawler::PageCrawler;
use linklazarus::domain::services::result_set_fetcher::ResultSetFetcher;
use linklazarus::engines::reqwest_engine::ReqwestEngine;
use linklazarus::infrastructure::repositories::finding_repo_impl::FindingRepositoryImpl;
use linklazarus::infrastructure::repositories::job_repo_impl::JobRepositoryImpl;
use linklazarus::infrastructure::serp::dataforseo::DataForSeoClient;
use linklazarus::utils::retry_policy::RetryPolicy;
use linklazarus::workers::orchestrator::{JobOrchestrator, OrchestratorConfig};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 一次测试使用的全部组件
#[allow(dead_code)]
pub struct TestPipeline {
    pub db: Arc<DatabaseConnection>,
    pub jobs: Arc<JobRepositoryImpl>,
    pub findings: Arc<FindingRepositoryImpl>,
    pub orchestrator: Arc<JobOrchestrator>,
    /// 保持服务商模拟服务存活
    pub serp: MockServer,
}

/// 已迁移的单连接内存数据库
pub async fn setup_db() -> Arc<DatabaseConnection> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    Arc::new(db)
}

/// 在随机端口上启动本地站点
pub async fn spawn_site(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// 链接目标站点：`/alive` 返回 200，`/dead` 返回 404，`/gone` 返回 410
pub async fn spawn_link_targets() -> SocketAddr {
    spawn_site(
        Router::new()
            .route("/alive", get(|| async { "still here" }))
            .route("/dead", get(|| async { StatusCode::NOT_FOUND }))
            .route("/gone", get(|| async { StatusCode::GONE })),
    )
    .await
}

/// 候选页面站点，每个路径返回一个只含给定链接的页面
pub async fn spawn_pages(pages: Vec<(&'static str, String)>) -> SocketAddr {
    let mut app = Router::new();
    for (route, body) in pages {
        app = app.route(route, get(move || async move { Html(body) }));
    }
    spawn_site(app).await
}

pub fn anchor(href: &str, text: &str) -> String {
    format!(r#"<html><body><p><a href="{href}">{text}</a></p></body></html>"#)
}

/// 返回给定地址的搜索结果服务商模拟
pub async fn mock_serp(urls: &[String]) -> MockServer {
    let server = MockServer::start().await;
    let items: Vec<_> = urls
        .iter()
        .enumerate()
        .map(|(i, url)| json!({"type": "organic", "rank_absolute": i + 1, "url": url}))
        .collect();
    Mock::given(method("POST"))
        .and(path("/v3/serp/google/organic/live/advanced"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status_code": 20000,
            "status_message": "Ok.",
            "tasks": [{
                "status_code": 20000,
                "result": [{"keyword": "widgets", "items": items}]
            }]
        })))
        .mount(&server)
        .await;
    server
}

pub fn http_settings() -> HttpSettings {
    HttpSettings {
        user_agent: "Mozilla/5.0 (compatible; linklazarus-test)".to_string(),
        page_timeout_seconds: 5,
        probe_timeout_seconds: 2,
        probe_max_redirects: 2,
    }
}

pub fn worker_settings() -> WorkerSettings {
    WorkerSettings {
        count: 1,
        max_candidates: 20,
        page_concurrency: 5,
        link_concurrency: 10,
        job_timeout_seconds: 60,
    }
}

/// 用真实的 HTTP 引擎、服务商客户端和 SQLite 仓库组装编排器
pub async fn build_pipeline(serp: MockServer) -> TestPipeline {
    let db = setup_db().await;
    let jobs = Arc::new(JobRepositoryImpl::new(db.clone()));
    let findings = Arc::new(FindingRepositoryImpl::new(db.clone()));

    let serp_settings = SerpSettings {
        endpoint: format!("{}/v3/serp/google/organic/live/advanced", serp.uri()),
        login: "user".to_string(),
        password: "pass".to_string(),
        depth: 30,
        timeout_seconds: 5,
        max_retries: 0,
        regions: Default::default(),
    };
    let provider = DataForSeoClient::new(&serp_settings)
        .unwrap()
        .with_retry_policy(RetryPolicy::immediate(0));

    let engine = Arc::new(ReqwestEngine::new(&http_settings()).unwrap());
    let filter = Arc::new(DomainFilter::default());

    let orchestrator = Arc::new(JobOrchestrator::new(
        jobs.clone(),
        Arc::new(ResultSetFetcher::new(
            Arc::new(provider),
            RegionTable::builtin(),
            filter.clone(),
            serp_settings.depth,
        )),
        Arc::new(PageCrawler::new(engine.clone(), filter)),
        Arc::new(LinkStatusChecker::new(engine)),
        Arc::new(FindingAggregator::new(findings.clone())),
        OrchestratorConfig::from(&worker_settings()),
    ));

    TestPipeline {
        db,
        jobs,
        findings,
        orchestrator,
        serp,
    }
}

/// 以提交方的身份创建一个待处理任务并返回对应的队列消息
pub async fn submit_job(jobs: &JobRepositoryImpl, keyword: &str, region: &str) -> JobMessage {
    let job = Job::new(Uuid::new_v4(), keyword, region);
    jobs.create(&job).await.unwrap();
    JobMessage::from(&job)
}
