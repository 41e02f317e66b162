// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 任务编排器、消费队列的工作循环和工作器生命周期管理
pub mod crawl_worker;
pub mod manager;
pub mod orchestrator;
pub mod worker;

pub use worker::Worker;
