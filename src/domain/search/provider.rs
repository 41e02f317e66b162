// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::serp::SerpResponse;
use async_trait::async_trait;
use thiserror::Error;

/// 搜索结果服务商错误
///
/// 除 `UnknownRegion` 与 `EmptyKeyword` 外，均视为服务商调用失败，对任务是致命的。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerpError {
    #[error("Unknown region code '{0}'")]
    UnknownRegion(String),
    #[error("Keyword must not be empty")]
    EmptyKeyword,
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Timeout")]
    Timeout,
    #[error("Provider returned HTTP {status}")]
    Status { status: u16 },
    #[error("Provider rejected the request ({code}): {message}")]
    Provider { code: i64, message: String },
    #[error("Malformed provider payload: {0}")]
    Malformed(String),
}

impl SerpError {
    /// 是否属于输入错误（在任务进入处理前就能判断）
    pub fn is_input_error(&self) -> bool {
        matches!(self, SerpError::UnknownRegion(_) | SerpError::EmptyKeyword)
    }

    /// 是否值得重试
    pub fn is_transient(&self) -> bool {
        match self {
            SerpError::Transport(_) | SerpError::Timeout => true,
            SerpError::Status { status } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// 一次搜索请求的参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerpQuery {
    pub keyword: String,
    pub location_code: u32,
    pub language_code: String,
    pub depth: usize,
}

#[async_trait]
pub trait SerpProvider: Send + Sync {
    /// 执行查询并返回原始的嵌套结果
    async fn search(&self, query: &SerpQuery) -> Result<SerpResponse, SerpError>;

    /// 服务商名称
    fn name(&self) -> &'static str;
}
