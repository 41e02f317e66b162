// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{anchor, build_pipeline, mock_serp, spawn_link_targets, spawn_pages, submit_job};
use linklazarus::domain::models::job::{JobFailure, JobStatus};
use linklazarus::domain::repositories::finding_repository::FindingRepository;
use linklazarus::domain::repositories::job_repository::JobRepository;
use linklazarus::queue::job_queue::{JobQueue, PostgresJobQueue};
use linklazarus::workers::manager::WorkerManager;
use linklazarus::workers::orchestrator::JobOutcome;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// widgets/de：C 被域名过滤，A 的链接可用，B 的链接返回 404
#[tokio::test]
async fn test_widgets_de_end_to_end() {
    let targets = spawn_link_targets().await;
    let l1 = format!("http://localhost:{}/alive", targets.port());
    let l2 = format!("http://localhost:{}/dead", targets.port());

    let site = spawn_pages(vec![
        ("/a", anchor(&l1, "Widget supplier")),
        ("/b", anchor(&l2, "Discontinued widget guide")),
    ])
    .await;
    let a = format!("http://{}/a", site);
    let b = format!("http://{}/b", site);
    let c = "https://www.facebook.com/widgets".to_string();

    let pipeline = build_pipeline(mock_serp(&[a, b.clone(), c]).await).await;
    let message = submit_job(&pipeline.jobs, "widgets", "de").await;

    let outcome = pipeline.orchestrator.process(&message).await.unwrap();
    assert_eq!(outcome, JobOutcome::Completed { result_count: 1 });

    let job = pipeline.jobs.get_job(message.job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.result_count, 1);
    assert!(job.started_at.is_some());
    assert!(job.completed_at.is_some());

    let findings = pipeline.findings.find_by_job(message.job_id).await.unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].source_url, b);
    assert_eq!(findings[0].broken_url, l2);
    assert_eq!(findings[0].status_code, 404);
    assert_eq!(findings[0].anchor_text, "Discontinued widget guide");
}

#[tokio::test]
async fn test_gone_and_unresolvable_targets_are_findings() {
    let targets = spawn_link_targets().await;
    let gone = format!("http://localhost:{}/gone", targets.port());
    let refused = "http://localhost:1/nothing-listens-here".to_string();

    let body = format!(
        r##"<a href="#reviews">Reviews</a>
            <a href="javascript:void(0)">Menu</a>
            <a href="/local">Local</a>
            <a href="{gone}">Retired product</a>
            <a href="{refused}">Dead host</a>"##
    );
    let site = spawn_pages(vec![("/page", body)]).await;
    let page = format!("http://{}/page", site);

    let pipeline = build_pipeline(mock_serp(&[page]).await).await;
    let message = submit_job(&pipeline.jobs, "widgets", "us").await;

    let outcome = pipeline.orchestrator.process(&message).await.unwrap();
    assert_eq!(outcome, JobOutcome::Completed { result_count: 2 });

    let mut codes: Vec<i32> = pipeline
        .findings
        .find_by_job(message.job_id)
        .await
        .unwrap()
        .iter()
        .map(|f| f.status_code)
        .collect();
    codes.sort();
    assert_eq!(codes, vec![0, 410]);
}

#[tokio::test]
async fn test_provider_outage_fails_job() {
    let serp = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&serp)
        .await;

    let pipeline = build_pipeline(serp).await;
    let message = submit_job(&pipeline.jobs, "widgets", "de").await;

    let outcome = pipeline.orchestrator.process(&message).await.unwrap();
    assert!(matches!(outcome, JobOutcome::Failed(JobFailure::Provider(_))));

    let job = pipeline.jobs.get_job(message.job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.result_count, 0);
    assert!(job.error_message.is_some());
}

#[tokio::test]
async fn test_zero_findings_still_completes() {
    let targets = spawn_link_targets().await;
    let alive = format!("http://localhost:{}/alive", targets.port());
    let site = spawn_pages(vec![("/ok", anchor(&alive, "Fine"))]).await;

    let pipeline = build_pipeline(mock_serp(&[format!("http://{}/ok", site)]).await).await;
    let message = submit_job(&pipeline.jobs, "widgets", "de").await;

    let outcome = pipeline.orchestrator.process(&message).await.unwrap();
    assert_eq!(outcome, JobOutcome::Completed { result_count: 0 });
}

/// 通过队列和工作管理器运行，任务完成后消息被确认
#[tokio::test]
async fn test_worker_manager_drains_queue() {
    let targets = spawn_link_targets().await;
    let dead = format!("http://localhost:{}/dead", targets.port());
    let site = spawn_pages(vec![("/b", anchor(&dead, "Broken"))]).await;

    let pipeline = build_pipeline(mock_serp(&[format!("http://{}/b", site)]).await).await;
    let queue = Arc::new(PostgresJobQueue::new(
        pipeline.db.clone(),
        "crawl-jobs",
        Duration::from_secs(900),
    ));

    let first = submit_job(&pipeline.jobs, "widgets", "de").await;
    let second = submit_job(&pipeline.jobs, "gadgets", "us").await;
    queue.enqueue(&first).await.unwrap();
    queue.enqueue(&second).await.unwrap();

    let mut manager = WorkerManager::new(
        queue.clone(),
        pipeline.orchestrator.clone(),
        Duration::from_millis(20),
    );
    manager.start_workers(2);

    let mut done = false;
    for _ in 0..300 {
        let a = pipeline.jobs.get_job(first.job_id).await.unwrap().unwrap();
        let b = pipeline.jobs.get_job(second.job_id).await.unwrap().unwrap();
        if a.status.is_terminal() && b.status.is_terminal() {
            done = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    manager.shutdown(Duration::from_secs(5)).await;
    assert!(done, "jobs did not finish in time");

    for id in [first.job_id, second.job_id] {
        let job = pipeline.jobs.get_job(id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.result_count, 1);
        assert_eq!(pipeline.findings.count_by_job(id).await.unwrap(), 1);
    }
    assert!(queue
        .dequeue(uuid::Uuid::new_v4())
        .await
        .unwrap()
        .is_none());
}
