// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::WorkerError;
use async_trait::async_trait;

/// 由 [`WorkerManager`](crate::workers::manager::WorkerManager) 启动的长期运行循环
///
/// `run` 只在关闭信号到达后返回；返回错误表示循环异常终止。
#[async_trait]
pub trait Worker: Send + Sync {
    async fn run(&self) -> Result<(), WorkerError>;

    /// 用于日志的工作器标识
    fn name(&self) -> &str;
}
