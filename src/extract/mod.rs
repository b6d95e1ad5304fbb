//! 结构恢复抽取器
//!
//! 生成服务被要求只输出 JSON，但实际输出常被说明文字、Markdown 代码围栏包裹，或包含多个候选块。
//! `extract` 依次尝试（每步是上一步的兜底）：
//! 1. 整段直接解析；
//! 2. 枚举全部 `{…}` / `[…]` 候选块并按优先级排序（对象先于数组、长者优先、等长时靠后者优先）；
//! 3. 依次去掉候选块首尾围栏后解析，返回第一个成功者；
//! 4. 去掉全文所有围栏，取第一个 `{` 到最后一个 `}` 解析。
//!
//! 全部失败返回 `None`：这是确定性的「无可恢复结构」结论，而非错误。

pub mod candidate;

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

pub use candidate::{Candidate, DelimiterKind};

/// 默认候选块上限
pub const DEFAULT_MAX_CANDIDATES: usize = 50_000;

static LEADING_FENCE_RE: OnceLock<Regex> = OnceLock::new();
static ANY_FENCE_RE: OnceLock<Regex> = OnceLock::new();

/// 去掉首尾的代码围栏（```json / ``` 等，带或不带语言标签）
pub fn strip_fence(s: &str) -> &str {
    let re = LEADING_FENCE_RE.get_or_init(|| Regex::new(r"^```[A-Za-z0-9_+-]*").unwrap());
    let mut out = s.trim();
    if let Some(m) = re.find(out) {
        out = &out[m.end()..];
    }
    if let Some(stripped) = out.strip_suffix("```") {
        out = stripped;
    }
    out.trim()
}

/// 去掉全文所有围栏标记
pub fn strip_all_fences(s: &str) -> String {
    let re = ANY_FENCE_RE.get_or_init(|| Regex::new(r"```[A-Za-z0-9_+-]*").unwrap());
    re.replace_all(s, "").trim().to_string()
}

/// 抽取器：持有候选块上限，其余无状态，可跨线程共享
#[derive(Debug, Clone)]
pub struct RecoveryExtractor {
    max_candidates: usize,
}

impl Default for RecoveryExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CANDIDATES)
    }
}

impl RecoveryExtractor {
    pub fn new(max_candidates: usize) -> Self {
        Self {
            max_candidates: max_candidates.max(1),
        }
    }

    pub fn extract(&self, text: &str) -> Option<Value> {
        if text.trim().is_empty() {
            return None;
        }

        if let Ok(v) = serde_json::from_str::<Value>(text) {
            return Some(v);
        }

        let mut candidates = candidate::enumerate(text, self.max_candidates);
        candidate::prioritize(&mut candidates);
        tracing::debug!("Trying {} candidate blocks", candidates.len());

        for c in &candidates {
            if let Ok(v) = serde_json::from_str::<Value>(strip_fence(c.slice(text))) {
                return Some(v);
            }
        }

        let cleaned = strip_all_fences(text);
        if let (Some(first), Some(last)) = (cleaned.find('{'), cleaned.rfind('}')) {
            if first < last {
                if let Ok(v) = serde_json::from_str::<Value>(&cleaned[first..=last]) {
                    return Some(v);
                }
            }
        }

        None
    }
}

/// 使用默认上限抽取
pub fn extract(text: &str) -> Option<Value> {
    RecoveryExtractor::default().extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean_json_matches_direct_parse() {
        for text in [
            r#"{"a": 1, "b": [1, 2, {"c": null}]}"#,
            r#"[{"x": "y"}, 3]"#,
            "  {\"nested\": {\"deep\": true}}\n",
        ] {
            let direct: Value = serde_json::from_str(text).unwrap();
            assert_eq!(extract(text), Some(direct));
        }
    }

    #[test]
    fn test_fenced_block() {
        let text = "Here you go:\n```json\n{\"a\":1}\n```";
        assert_eq!(extract(text), Some(json!({"a": 1})));
    }

    #[test]
    fn test_fence_without_language_tag() {
        let text = "```\n{\"a\": [1, 2]}\n```";
        assert_eq!(extract(text), Some(json!({"a": [1, 2]})));
    }

    #[test]
    fn test_prefers_longer_candidate_regardless_of_order() {
        let short_first = r#"draft {"a":1} final {"a":1,"b":2}"#;
        let long_first = r#"final {"a":1,"b":2} draft {"a":1}"#;
        assert_eq!(extract(short_first), Some(json!({"a": 1, "b": 2})));
        assert_eq!(extract(long_first), Some(json!({"a": 1, "b": 2})));
    }

    #[test]
    fn test_equal_length_prefers_later() {
        let text = r#"first {"a":1} then {"b":2} done"#;
        assert_eq!(extract(text), Some(json!({"b": 2})));
    }

    #[test]
    fn test_nested_object_in_prose() {
        let text = r#"Sure! {"participants": ["Alice"], "meta": {"n": 1}} Hope that helps."#;
        assert_eq!(
            extract(text),
            Some(json!({"participants": ["Alice"], "meta": {"n": 1}}))
        );
    }

    #[test]
    fn test_object_preferred_over_longer_array() {
        let text = r#"[1, 2, 3, 4, 5, 6, 7, 8] and {"k":1}"#;
        assert_eq!(extract(text), Some(json!({"k": 1})));
    }

    #[test]
    fn test_array_when_no_object() {
        let text = "The list is [1, 2, 3].";
        assert_eq!(extract(text), Some(json!([1, 2, 3])));
    }

    #[test]
    fn test_no_balanced_delimiters_fails() {
        assert_eq!(extract("nothing structured here"), None);
        assert_eq!(extract("} backwards {"), None);
        assert_eq!(extract(""), None);
        assert_eq!(extract("   "), None);
    }

    #[test]
    fn test_balanced_but_invalid_fails() {
        assert_eq!(extract("{not json} and [also, not]"), None);
    }

    #[test]
    fn test_fallback_strips_inner_fences() {
        let text = "{\"a\": ```json 1```}";
        assert_eq!(extract(text), Some(json!({"a": 1})));
    }

    #[test]
    fn test_strip_fence() {
        assert_eq!(strip_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_fence("```yaml {}```"), "{}");
        assert_eq!(strip_fence("  {}  "), "{}");
    }

    #[test]
    fn test_small_candidate_limit_still_finds_outer_block() {
        let extractor = RecoveryExtractor::new(1);
        let text = r#"note: {"a": {"b": 1}}"#;
        assert_eq!(extractor.extract(text), Some(json!({"a": {"b": 1}})));
    }

    #[test]
    fn test_multibyte_text_is_sliced_safely() {
        let text = "会议结果如下：{\"参与者\": [\"张三\"]} 完毕";
        assert_eq!(extract(text), Some(json!({"参与者": ["张三"]})));
    }
}
