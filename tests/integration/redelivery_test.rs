// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{anchor, build_pipeline, mock_serp, spawn_link_targets, spawn_pages, submit_job};
use linklazarus::domain::models::finding::BrokenLinkFinding;
use linklazarus::domain::models::job::JobStatus;
use linklazarus::domain::models::link::ExtractedLink;
use linklazarus::domain::repositories::finding_repository::FindingRepository;
use linklazarus::domain::repositories::job_repository::JobRepository;
use linklazarus::queue::job_queue::{JobQueue, PostgresJobQueue};
use linklazarus::workers::orchestrator::JobOutcome;
use std::time::Duration;
use uuid::Uuid;

async fn two_dead_links_site() -> (String, String, String) {
    let targets = spawn_link_targets().await;
    let dead = format!("http://localhost:{}/dead", targets.port());
    let gone = format!("http://localhost:{}/gone", targets.port());
    let site = spawn_pages(vec![
        ("/one", anchor(&dead, "First")),
        ("/two", anchor(&gone, "Second")),
    ])
    .await;
    (
        format!("http://{}/one", site),
        format!("http://{}/two", site),
        dead,
    )
}

/// 同一条消息处理两次：第二次不做任何工作，结果不变
#[tokio::test]
async fn test_replayed_message_is_idempotent() {
    let (one, two, _) = two_dead_links_site().await;
    let pipeline = build_pipeline(mock_serp(&[one, two]).await).await;
    let message = submit_job(&pipeline.jobs, "widgets", "de").await;

    let first = pipeline.orchestrator.process(&message).await.unwrap();
    assert_eq!(first, JobOutcome::Completed { result_count: 2 });

    let second = pipeline.orchestrator.process(&message).await.unwrap();
    assert_eq!(second, JobOutcome::AlreadyTerminal(JobStatus::Completed));

    let job = pipeline.jobs.get_job(message.job_id).await.unwrap().unwrap();
    assert_eq!(job.result_count, 2);
    assert_eq!(pipeline.findings.count_by_job(message.job_id).await.unwrap(), 2);
}

/// 上次执行在写入部分结果后崩溃，重新执行不产生重复记录
#[tokio::test]
async fn test_rerun_after_crash_mid_persist() {
    let (one, two, dead) = two_dead_links_site().await;
    let pipeline = build_pipeline(mock_serp(&[one.clone(), two]).await).await;
    let message = submit_job(&pipeline.jobs, "widgets", "de").await;

    pipeline
        .jobs
        .update_job_status(message.job_id, JobStatus::Processing, None, None)
        .await
        .unwrap();
    let earlier = ExtractedLink::new(one, dead, "First");
    pipeline
        .findings
        .insert_finding(&BrokenLinkFinding::new(message.job_id, &earlier, 404))
        .await
        .unwrap();

    let outcome = pipeline.orchestrator.process(&message).await.unwrap();
    assert_eq!(outcome, JobOutcome::Completed { result_count: 2 });
    assert_eq!(pipeline.findings.count_by_job(message.job_id).await.unwrap(), 2);
}

/// 未确认的消息在租约过期后被重新投递，已完成的任务直接确认
#[tokio::test]
async fn test_unacked_message_is_redelivered_after_lease() {
    let (one, two, _) = two_dead_links_site().await;
    let pipeline = build_pipeline(mock_serp(&[one, two]).await).await;
    let queue = PostgresJobQueue::new(pipeline.db.clone(), "crawl-jobs", Duration::from_millis(300));

    let message = submit_job(&pipeline.jobs, "widgets", "de").await;
    queue.enqueue(&message).await.unwrap();

    // worker finishes the job but dies before acking
    let delivery = queue.dequeue(Uuid::new_v4()).await.unwrap().unwrap();
    assert!(queue.dequeue(Uuid::new_v4()).await.unwrap().is_none());
    let outcome = pipeline.orchestrator.process(&delivery.message).await.unwrap();
    assert_eq!(outcome, JobOutcome::Completed { result_count: 2 });

    tokio::time::sleep(Duration::from_millis(350)).await;

    let redelivered = queue.dequeue(Uuid::new_v4()).await.unwrap().unwrap();
    assert_eq!(redelivered.delivery_count, 2);
    assert_eq!(redelivered.message, message);

    let outcome = pipeline.orchestrator.process(&redelivered.message).await.unwrap();
    assert_eq!(outcome, JobOutcome::AlreadyTerminal(JobStatus::Completed));
    queue.ack(&redelivered).await.unwrap();

    assert!(queue.dequeue(Uuid::new_v4()).await.unwrap().is_none());
    assert_eq!(pipeline.findings.count_by_job(message.job_id).await.unwrap(), 2);
}
