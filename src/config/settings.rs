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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含数据库、队列、工作器、HTTP、SERP 服务商、域名过滤等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// Redis配置
    pub redis: RedisSettings,
    /// 队列配置
    pub queue: QueueSettings,
    /// 工作器配置
    pub worker: WorkerSettings,
    /// 出站 HTTP 配置
    pub http: HttpSettings,
    /// 搜索结果服务商配置
    pub serp: SerpSettings,
    /// 域名过滤配置
    #[serde(default)]
    pub filter: FilterSettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
    /// 健康检查服务器配置
    pub server: ServerSettings,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
    /// 启动时是否执行迁移
    pub run_migrations: bool,
}

/// Redis配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    /// Redis连接URL
    pub url: String,
}

/// 队列后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueBackend {
    Postgres,
    Redis,
}

/// 队列配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct QueueSettings {
    /// 队列后端
    pub backend: QueueBackend,
    /// 队列名称
    pub name: String,
    /// 租约时长（秒），未确认的消息在租约过期后重新投递
    pub lease_seconds: u64,
    /// 空队列时的轮询间隔（毫秒）
    pub poll_interval_ms: u64,
}

/// 工作器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    /// 每个进程中并发运行的编排器数量
    pub count: usize,
    /// 每个任务处理的候选页面上限
    pub max_candidates: usize,
    /// 页面抓取并发数
    pub page_concurrency: usize,
    /// 链接探测并发数
    pub link_concurrency: usize,
    /// 单个任务的整体时间预算（秒）
    pub job_timeout_seconds: u64,
}

/// 出站HTTP配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    /// 页面抓取和链接探测使用的 User-Agent
    pub user_agent: String,
    /// 页面抓取超时（秒）
    pub page_timeout_seconds: u64,
    /// 链接探测超时（秒）
    pub probe_timeout_seconds: u64,
    /// 链接探测允许的最大重定向次数
    pub probe_max_redirects: usize,
}

/// 地区参数
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegionSettings {
    /// 服务商位置编码
    pub location_code: u32,
    /// 服务商语言编码
    pub language_code: String,
}

/// 搜索结果服务商配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SerpSettings {
    /// 服务商接口地址
    pub endpoint: String,
    /// 登录名
    pub login: String,
    /// 密码
    pub password: String,
    /// 请求的结果深度
    pub depth: usize,
    /// 请求超时（秒）
    pub timeout_seconds: u64,
    /// 瞬时错误的最大重试次数
    pub max_retries: u32,
    /// 附加的地区映射，与内置映射合并
    #[serde(default)]
    pub regions: HashMap<String, RegionSettings>,
}

/// 域名过滤配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct FilterSettings {
    /// 屏蔽的域名子串
    #[serde(default = "default_blocked_domains")]
    pub blocked_domains: Vec<String>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            blocked_domains: default_blocked_domains(),
        }
    }
}

/// 指标导出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 导出监听地址
    pub listen_addr: String,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 默认屏蔽的大型平台
pub const DEFAULT_BLOCKED_DOMAINS: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "pinterest.com",
    "linkedin.com",
    "youtube.com",
    "amazon.com",
    "amazon.de",
    "ebay.com",
    "ebay.de",
    "wikipedia.org",
    "reddit.com",
    "quora.com",
];

fn default_blocked_domains() -> Vec<String> {
    DEFAULT_BLOCKED_DOMAINS
        .iter()
        .map(|d| d.to_string())
        .collect()
}

impl WorkerSettings {
    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_seconds)
    }
}

impl HttpSettings {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_seconds)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("LINKLAZARUS").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 仅包含默认值的配置构建器
    pub fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError>
    {
        Config::builder()
            // Server (health endpoint)
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3001)?
            // Database
            .set_default(
                "database.url",
                "postgresql://localhost:5432/linklazarus",
            )?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 2)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            .set_default("database.run_migrations", true)?
            // Redis
            .set_default("redis.url", "redis://localhost:6379")?
            // Queue
            .set_default("queue.backend", "postgres")?
            .set_default("queue.name", "crawl-jobs")?
            .set_default("queue.lease_seconds", 900)?
            .set_default("queue.poll_interval_ms", 1000)?
            // Worker
            .set_default("worker.count", 2)?
            .set_default("worker.max_candidates", 20)?
            .set_default("worker.page_concurrency", 5)?
            .set_default("worker.link_concurrency", 10)?
            .set_default("worker.job_timeout_seconds", 600)?
            // Outbound HTTP
            .set_default(
                "http.user_agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
            )?
            .set_default("http.page_timeout_seconds", 10)?
            .set_default("http.probe_timeout_seconds", 5)?
            .set_default("http.probe_max_redirects", 2)?
            // SERP provider
            .set_default(
                "serp.endpoint",
                "https://api.dataforseo.com/v3/serp/google/organic/live/advanced",
            )?
            .set_default("serp.login", "")?
            .set_default("serp.password", "")?
            .set_default("serp.depth", 30)?
            .set_default("serp.timeout_seconds", 30)?
            .set_default("serp.max_retries", 2)?
            // Metrics
            .set_default("metrics.enabled", true)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
