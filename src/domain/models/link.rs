// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 锚文本最大字符数
pub const ANCHOR_TEXT_MAX_CHARS: usize = 100;

/// 从页面中提取出的外部链接
///
/// 只在一次任务执行期间存在于内存中，由页面爬取器产生，链接检查器消费。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedLink {
    /// 链接所在页面
    pub source_url: String,
    /// 解析后的绝对目标地址
    pub target_url: String,
    /// 锚文本，最多 100 个字符
    pub anchor_text: String,
}

impl ExtractedLink {
    pub fn new(
        source_url: impl Into<String>,
        target_url: impl Into<String>,
        anchor_text: &str,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            target_url: target_url.into(),
            anchor_text: truncate_anchor_text(anchor_text),
        }
    }
}

/// 折叠空白并截断锚文本
///
/// 按字符而不是字节截断，避免切断多字节字符。
pub fn truncate_anchor_text(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(ANCHOR_TEXT_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_text_is_collapsed_and_truncated() {
        let long = format!("  Über   {}  ", "ä".repeat(200));
        let text = truncate_anchor_text(&long);
        assert_eq!(text.chars().count(), ANCHOR_TEXT_MAX_CHARS);
        assert!(text.starts_with("Über ä"));
    }

    #[test]
    fn test_short_anchor_text_is_kept() {
        let link = ExtractedLink::new("http://a.test/", "http://b.test/", "\n Read more\t");
        assert_eq!(link.anchor_text, "Read more");
    }
}
