// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MetricsSettings;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, warn};

pub const JOBS_STARTED: &str = "linklazarus_jobs_started_total";
pub const JOBS_COMPLETED: &str = "linklazarus_jobs_completed_total";
pub const JOBS_FAILED: &str = "linklazarus_jobs_failed_total";
pub const JOB_DURATION: &str = "linklazarus_job_duration_seconds";
pub const PAGES_CRAWLED: &str = "linklazarus_pages_crawled_total";
pub const PAGES_SKIPPED: &str = "linklazarus_pages_skipped_total";
pub const LINKS_CHECKED: &str = "linklazarus_links_checked_total";
pub const BROKEN_LINKS_FOUND: &str = "linklazarus_broken_links_found_total";

/// 初始化指标系统
///
/// 安装 Prometheus 导出器并注册指标说明。端口被占用时只记录警告。
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        info!("Metrics exporter disabled");
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!(addr = %settings.listen_addr, error = %e, "Invalid metrics address");
            return;
        }
    };

    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}", e);
        return;
    }

    describe_counter!(JOBS_STARTED, "Jobs picked up by an orchestrator");
    describe_counter!(JOBS_COMPLETED, "Jobs that reached completed");
    describe_counter!(JOBS_FAILED, "Jobs that reached failed, by reason");
    describe_histogram!(JOB_DURATION, "Wall-clock duration of one job run in seconds");
    describe_counter!(PAGES_CRAWLED, "Candidate pages fetched and parsed");
    describe_counter!(PAGES_SKIPPED, "Candidate pages skipped after a fetch error");
    describe_counter!(LINKS_CHECKED, "Distinct link targets probed");
    describe_counter!(BROKEN_LINKS_FOUND, "Broken links found, by status code");

    info!("Metrics exporter listening on {}", addr);
}

pub fn record_job_started() {
    counter!(JOBS_STARTED).increment(1);
}

pub fn record_job_completed(duration: Duration) {
    counter!(JOBS_COMPLETED).increment(1);
    histogram!(JOB_DURATION).record(duration.as_secs_f64());
}

pub fn record_job_failed(reason: &'static str, duration: Duration) {
    counter!(JOBS_FAILED, "reason" => reason).increment(1);
    histogram!(JOB_DURATION).record(duration.as_secs_f64());
}

pub fn record_page(crawled: bool) {
    if crawled {
        counter!(PAGES_CRAWLED).increment(1);
    } else {
        counter!(PAGES_SKIPPED).increment(1);
    }
}

pub fn record_links_checked(count: usize) {
    counter!(LINKS_CHECKED).increment(count as u64);
}

pub fn record_broken_link(status_code: i32) {
    counter!(BROKEN_LINKS_FOUND, "status" => status_code.to_string()).increment(1);
}
