// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{anchor, build_pipeline, mock_serp, spawn_link_targets, spawn_pages, submit_job};
use axum::{http::StatusCode, routing::get, Json, Router};
use linklazarus::domain::models::job::JobStatus;
use linklazarus::domain::repositories::finding_repository::FindingRepository;
use linklazarus::domain::repositories::job_repository::JobRepository;
use linklazarus::workers::orchestrator::JobOutcome;

/// 无法连接的候选页面被跳过，其余页面的结果照常写入
#[tokio::test]
async fn test_connection_refused_page_is_skipped() {
    let targets = spawn_link_targets().await;
    let dead = format!("http://localhost:{}/dead", targets.port());
    let site = spawn_pages(vec![("/b", anchor(&dead, "Broken"))]).await;
    let reachable = format!("http://{}/b", site);

    let pipeline = build_pipeline(
        mock_serp(&["http://127.0.0.1:1/down".to_string(), reachable.clone()]).await,
    )
    .await;
    let message = submit_job(&pipeline.jobs, "widgets", "de").await;

    let outcome = pipeline.orchestrator.process(&message).await.unwrap();
    assert_eq!(outcome, JobOutcome::Completed { result_count: 1 });

    let findings = pipeline.findings.find_by_job(message.job_id).await.unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].source_url, reachable);
}

/// 返回错误状态或非 HTML 内容的页面同样被跳过
#[tokio::test]
async fn test_error_and_non_html_pages_are_skipped() {
    let targets = spawn_link_targets().await;
    let dead = format!("http://localhost:{}/dead", targets.port());
    let site = spawn_pages(vec![("/good", anchor(&dead, "Broken"))]).await;

    let odd = super::helpers::spawn_site(
        Router::new()
            .route("/500", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .route(
                "/json",
                get(|| async { Json(serde_json::json!({"href": "http://localhost:1/"})) }),
            ),
    )
    .await;

    let pipeline = build_pipeline(
        mock_serp(&[
            format!("http://{}/500", odd),
            format!("http://{}/json", odd),
            format!("http://{}/good", site),
        ])
        .await,
    )
    .await;
    let message = submit_job(&pipeline.jobs, "widgets", "de").await;

    let outcome = pipeline.orchestrator.process(&message).await.unwrap();
    assert_eq!(outcome, JobOutcome::Completed { result_count: 1 });
}

/// 所有候选页面都失败时任务仍然完成，结果数为 0
#[tokio::test]
async fn test_all_pages_unreachable_completes_empty() {
    let pipeline = build_pipeline(
        mock_serp(&[
            "http://127.0.0.1:1/a".to_string(),
            "http://127.0.0.1:1/b".to_string(),
        ])
        .await,
    )
    .await;
    let message = submit_job(&pipeline.jobs, "widgets", "de").await;

    let outcome = pipeline.orchestrator.process(&message).await.unwrap();
    assert_eq!(outcome, JobOutcome::Completed { result_count: 0 });

    let job = pipeline.jobs.get_job(message.job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.result_count, 0);
}
