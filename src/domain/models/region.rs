// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::RegionSettings;
use std::collections::HashMap;

/// 服务商的地区参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionParams {
    pub location_code: u32,
    pub language_code: String,
}

/// 地区编码到服务商参数的查找表
///
/// 内置 `de` 与 `us`，配置中的条目会覆盖或追加。编码不区分大小写。
#[derive(Debug, Clone)]
pub struct RegionTable {
    entries: HashMap<String, RegionParams>,
}

impl RegionTable {
    /// 仅包含内置地区的查找表
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            "de".to_string(),
            RegionParams {
                location_code: 2756,
                language_code: "de".to_string(),
            },
        );
        entries.insert(
            "us".to_string(),
            RegionParams {
                location_code: 2840,
                language_code: "en".to_string(),
            },
        );
        Self { entries }
    }

    /// 在内置地区之上合并配置的地区
    pub fn with_overrides(overrides: &HashMap<String, RegionSettings>) -> Self {
        let mut table = Self::builtin();
        for (code, region) in overrides {
            table.entries.insert(
                code.trim().to_ascii_lowercase(),
                RegionParams {
                    location_code: region.location_code,
                    language_code: region.language_code.clone(),
                },
            );
        }
        table
    }

    pub fn lookup(&self, code: &str) -> Option<&RegionParams> {
        self.entries.get(&code.trim().to_ascii_lowercase())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.lookup(code).is_some()
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::builtin()
    }
}
