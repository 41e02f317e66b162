// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 引擎模块
///
/// 出站HTTP：页面抓取与链接探测
pub mod reqwest_engine;
pub mod traits;
