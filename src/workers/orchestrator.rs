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

use crate::config::settings::WorkerSettings;
use crate::domain::models::finding::{BrokenLinkFinding, LinkStatus};
use crate::domain::models::job::{JobFailure, JobStatus};
use crate::domain::models::job_message::JobMessage;
use crate::domain::models::link::ExtractedLink;
use crate::domain::repositories::job_repository::{JobRepository, RepositoryError};
use crate::domain::search::provider::SerpError;
use crate::domain::services::finding_aggregator::{dedup_findings, FindingAggregator};
use crate::domain::services::link_status_checker::LinkStatusChecker;
use crate::domain::services::page_crawler::PageCrawler;
use crate::domain::services::result_set_fetcher::ResultSetFetcher;
use crate::infrastructure::metrics;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// 编排器运行参数
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// 最多爬取的候选页面数
    pub max_candidates: usize,
    /// 并发爬取的页面数
    pub page_concurrency: usize,
    /// 并发探测的链接数
    pub link_concurrency: usize,
    /// 单个任务的时间预算
    pub job_timeout: Duration,
}

impl From<&WorkerSettings> for OrchestratorConfig {
    fn from(settings: &WorkerSettings) -> Self {
        Self {
            max_candidates: settings.max_candidates,
            page_concurrency: settings.page_concurrency.max(1),
            link_concurrency: settings.link_concurrency.max(1),
            job_timeout: settings.job_timeout(),
        }
    }
}

/// 一次任务执行的结果
///
/// 除 `Err` 之外的所有结果都意味着队列消息可以确认。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// 任务完成，附带最终结果数
    Completed { result_count: u64 },
    /// 任务以失败结束
    Failed(JobFailure),
    /// 任务在本次投递前已处于终态
    AlreadyTerminal(JobStatus),
    /// 消息引用的任务不存在
    Missing,
}

/// 任务编排器
///
/// 驱动单个任务走完 获取候选页面 → 爬取 → 探测 → 持久化，并负责任务状态机。
/// 只有候选页面获取失败和持久化失败会让任务失败，单个页面或链接的错误只记录日志。
pub struct JobOrchestrator {
    jobs: Arc<dyn JobRepository>,
    fetcher: Arc<ResultSetFetcher>,
    crawler: Arc<PageCrawler>,
    checker: Arc<LinkStatusChecker>,
    aggregator: Arc<FindingAggregator>,
    config: OrchestratorConfig,
}

impl JobOrchestrator {
    /// 创建任务编排器
    ///
    /// # 参数
    ///
    /// * `jobs` - 任务仓库
    /// * `fetcher` - 候选页面获取器
    /// * `crawler` - 页面爬取器
    /// * `checker` - 链接状态检查器
    /// * `aggregator` - 断链结果汇总器
    /// * `config` - 运行参数
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        fetcher: Arc<ResultSetFetcher>,
        crawler: Arc<PageCrawler>,
        checker: Arc<LinkStatusChecker>,
        aggregator: Arc<FindingAggregator>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            jobs,
            fetcher,
            crawler,
            checker,
            aggregator,
            config,
        }
    }

    /// 处理一条队列消息
    ///
    /// # 返回值
    ///
    /// * `Ok(JobOutcome)` - 任务已处于终态，消息可以确认
    /// * `Err(RepositoryError)` - 状态写入失败，消息应当释放以便重新投递
    #[instrument(
        skip(self, message),
        fields(job_id = %message.job_id, keyword = %message.keyword, region = %message.region)
    )]
    pub async fn process(&self, message: &JobMessage) -> Result<JobOutcome, RepositoryError> {
        let job_id = message.job_id;
        let started = Instant::now();

        let Some(job) = self.jobs.get_job(job_id).await? else {
            warn!("Job referenced by queue message does not exist");
            return Ok(JobOutcome::Missing);
        };

        if job.status.is_terminal() {
            info!(status = %job.status, "Job already finished, skipping redelivered message");
            return Ok(JobOutcome::AlreadyTerminal(job.status));
        }

        if let Err(reason) = self.validate(message) {
            warn!(reason = %reason, "Rejecting invalid job");
            return self
                .fail(job_id, JobFailure::InvalidInput(reason), started)
                .await;
        }

        if job.status == JobStatus::Processing {
            info!("Job was interrupted during a previous attempt, running again");
        }
        self.jobs
            .update_job_status(job_id, JobStatus::Processing, None, None)
            .await?;
        metrics::record_job_started();

        let findings = match tokio::time::timeout(self.config.job_timeout, self.run(message)).await
        {
            Ok(Ok(findings)) => findings,
            Ok(Err(e)) => {
                error!(error = %e, "Search results provider failed");
                return self
                    .fail(job_id, JobFailure::Provider(e.to_string()), started)
                    .await;
            }
            Err(_) => {
                error!(
                    budget_secs = self.config.job_timeout.as_secs(),
                    "Job exceeded its time budget"
                );
                return self
                    .fail(job_id, JobFailure::Timeout(self.config.job_timeout), started)
                    .await;
            }
        };

        match self.aggregator.persist(job_id, findings).await {
            Ok(result_count) => {
                info!(result_count, "Job completed");
                metrics::record_job_completed(started.elapsed());
                Ok(JobOutcome::Completed { result_count })
            }
            Err(RepositoryError::InvalidTransition { from, .. }) if from.is_terminal() => {
                warn!(status = %from, "Job finished concurrently by another delivery");
                Ok(JobOutcome::AlreadyTerminal(from))
            }
            Err(e) => {
                error!(error = %e, "Failed to persist findings");
                self.fail(job_id, JobFailure::Persistence(e.to_string()), started)
                    .await
            }
        }
    }

    /// 校验消息内容并确认地区可解析
    fn validate(&self, message: &JobMessage) -> Result<(), String> {
        message.validate().map_err(|e| e.to_string())?;
        self.fetcher
            .resolve(&message.keyword, &message.region)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    /// 获取候选页面并完成爬取和探测，返回本次执行的断链记录
    async fn run(&self, message: &JobMessage) -> Result<Vec<BrokenLinkFinding>, SerpError> {
        let mut candidates = self
            .fetcher
            .fetch(&message.keyword, &message.region)
            .await?;
        candidates.truncate(self.config.max_candidates);
        debug!(candidates = candidates.len(), "Crawling candidate pages");

        let links = self.crawl_candidates(candidates).await;
        let statuses = self.check_links(&links).await;
        Ok(build_findings(message.job_id, &links, &statuses))
    }

    /// 并发爬取候选页面，保持候选顺序，失败的页面被跳过
    async fn crawl_candidates(&self, candidates: Vec<String>) -> Vec<ExtractedLink> {
        let pages: Vec<(String, _)> = stream::iter(candidates)
            .map(|page_url| async move {
                let result = self.crawler.crawl(&page_url).await;
                (page_url, result)
            })
            .buffered(self.config.page_concurrency)
            .collect()
            .await;

        let mut links = Vec::new();
        for (page_url, result) in pages {
            match result {
                Ok(page_links) => {
                    debug!(page = %page_url, links = page_links.len(), "Crawled page");
                    metrics::record_page(true);
                    links.extend(page_links);
                }
                Err(e) => {
                    warn!(page = %page_url, error = %e, "Skipping page");
                    metrics::record_page(false);
                }
            }
        }
        links
    }

    /// 并发探测所有不同的目标地址
    ///
    /// 无法分类的目标不会出现在返回值中，等同于未失效。
    async fn check_links(&self, links: &[ExtractedLink]) -> HashMap<String, LinkStatus> {
        let mut seen = HashSet::new();
        let targets: Vec<String> = links
            .iter()
            .filter(|l| seen.insert(l.target_url.as_str()))
            .map(|l| l.target_url.clone())
            .collect();
        metrics::record_links_checked(targets.len());

        stream::iter(targets)
            .map(|target| async move {
                let result = self.checker.check(&target).await;
                (target, result)
            })
            .buffer_unordered(self.config.link_concurrency)
            .filter_map(|(target, result)| async move {
                match result {
                    Ok(status) => Some((target, status)),
                    Err(e) => {
                        warn!(link = %target, error = %e, "Could not classify link");
                        None
                    }
                }
            })
            .collect()
            .await
    }

    /// 写入失败状态
    ///
    /// 任务已被其他投递推进到终态时视为已终结。
    async fn fail(
        &self,
        job_id: Uuid,
        failure: JobFailure,
        started: Instant,
    ) -> Result<JobOutcome, RepositoryError> {
        match self
            .jobs
            .update_job_status(job_id, JobStatus::Failed, None, Some(failure.to_string()))
            .await
        {
            Ok(_) => {
                metrics::record_job_failed(failure_reason(&failure), started.elapsed());
                Ok(JobOutcome::Failed(failure))
            }
            Err(RepositoryError::InvalidTransition { from, .. }) if from.is_terminal() => {
                warn!(status = %from, "Job finished concurrently by another delivery");
                Ok(JobOutcome::AlreadyTerminal(from))
            }
            Err(e) => Err(e),
        }
    }
}

fn failure_reason(failure: &JobFailure) -> &'static str {
    match failure {
        JobFailure::InvalidInput(_) => "invalid_input",
        JobFailure::Provider(_) => "provider",
        JobFailure::Persistence(_) => "persistence",
        JobFailure::Timeout(_) => "timeout",
    }
}

/// 按提取顺序为每个失效目标生成断链记录，重复的记录键只保留一条
fn build_findings(
    job_id: Uuid,
    links: &[ExtractedLink],
    statuses: &HashMap<String, LinkStatus>,
) -> Vec<BrokenLinkFinding> {
    let findings = links
        .iter()
        .filter_map(|link| match statuses.get(&link.target_url) {
            Some(LinkStatus::Broken(code)) => Some(BrokenLinkFinding::new(job_id, link, *code)),
            _ => None,
        })
        .collect();

    let findings = dedup_findings(job_id, findings);
    for finding in &findings {
        metrics::record_broken_link(finding.status_code);
    }
    findings
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
