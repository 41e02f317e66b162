// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 分层加载工作进程配置：内置默认值、配置文件与 `LINKLAZARUS__` 环境变量
pub mod settings;
