// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::queue::job_queue::QueueError;
use thiserror::Error;

/// Worker错误类型
///
/// 只有会让工作循环本身停下的错误才会出现在这里，
/// 单个任务的失败由编排器写入任务状态。
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("队列错误: {0}")]
    Queue(#[from] QueueError),
}
