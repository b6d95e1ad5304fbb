//! 各阶段的结构化记录
//!
//! 每个阶段一个显式 schema：字段缺失时用 serde 默认值函数填充，标量类型不符（含 null）时降级为该类型的空值；
//! 列表逐元素解析，只丢弃无法解析的元素，字符串列表中的对象与数字转成文本保留。
//! 未声明的字段原样保留在 `extra` 中并回写到输出。`Default` 即「字段全部缺失」时的记录，
//! `StageRecord::fallback` 即恢复失败时的记录（`parse_error = true`）。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// 标量字段宽松解析：类型不符时取 `T::default()`，不让单个字段拖垮整条记录
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// 列表宽松解析：逐个元素反序列化，丢弃无法解析的元素而保留其余元素。
/// 单个对象视为只有一个元素的列表，其他非数组值视为空列表。
pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        obj @ Value::Object(_) => vec![obj],
        _ => return Ok(Vec::new()),
    };
    let total = items.len();
    let kept: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if kept.len() < total {
        tracing::debug!("Dropped {} malformed list elements", total - kept.len());
    }
    Ok(kept)
}

/// 字符串列表宽松解析：非字符串元素转成文本而不是丢弃。
/// 对象优先取 `name`，其次取第一个字符串值；单个字符串视为一个元素。
pub(crate) fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(value_to_text).collect(),
        Value::String(s) => vec![s],
        _ => Vec::new(),
    })
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Object(map) => {
            let text = map
                .get("name")
                .and_then(Value::as_str)
                .or_else(|| map.values().find_map(Value::as_str))
                .map(String::from);
            Some(text.unwrap_or_else(|| Value::Object(map).to_string()))
        }
        other => Some(other.to_string()),
    }
}

/// id 宽松解析：接受正整数或数字字符串，0 与其他值视为缺失
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(id.filter(|id| *id > 0))
}

fn is_false(b: &bool) -> bool {
    !*b
}

// ─── Understanding ───

pub const NO_SUMMARY: &str = "No summary available";
pub const UNPARSED_SUMMARY: &str = "Unable to parse meeting content";

fn default_meeting_summary() -> String {
    NO_SUMMARY.to_string()
}

/// 会议理解阶段输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderstandingRecord {
    #[serde(default, deserialize_with = "lenient_strings")]
    pub participants: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub key_points: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub decisions: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub unresolved_issues: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub risks: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub topics: Vec<String>,
    #[serde(default = "default_meeting_summary", deserialize_with = "lenient")]
    pub meeting_summary: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub parse_error: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for UnderstandingRecord {
    fn default() -> Self {
        Self {
            participants: Vec::new(),
            key_points: Vec::new(),
            decisions: Vec::new(),
            unresolved_issues: Vec::new(),
            risks: Vec::new(),
            topics: Vec::new(),
            meeting_summary: default_meeting_summary(),
            parse_error: false,
            extra: Map::new(),
        }
    }
}

// ─── Action & Ownership ───

/// 行动项
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub task: String,
    #[serde(default, deserialize_with = "lenient")]
    pub owner: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub deadline: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub flagged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub flag_reason: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 行动项统计（后处理时根据标记结果重新计算）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionSummary {
    pub total_tasks: usize,
    pub assigned_tasks: usize,
    pub unassigned_tasks: usize,
    pub flagged_items: usize,
}

/// 行动与归属阶段输出
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    #[serde(default, deserialize_with = "lenient_list")]
    pub action_items: Vec<ActionItem>,
    #[serde(default, deserialize_with = "lenient")]
    pub summary: ActionSummary,
    #[serde(default, skip_serializing_if = "is_false")]
    pub parse_error: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ─── Follow-Up ───

pub const TIMEFRAME_NOT_SPECIFIED: &str = "Not specified";
pub const TIMEFRAME_UNDETERMINED: &str = "Unable to determine";

fn default_timeframe() -> String {
    TIMEFRAME_NOT_SPECIFIED.to_string()
}

/// 跟进动作；`priority_score` 只由后处理计算，输入中的同名字段会被覆盖
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpAction {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub action: String,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub urgency: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub suggested_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub involved_parties: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub priority_score: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 需要升级处理的事项
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Escalation {
    #[serde(default, deserialize_with = "lenient")]
    pub issue: String,
    #[serde(default, deserialize_with = "lenient")]
    pub escalate_to: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub reason: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 下次会议建议
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextMeetingSuggestion {
    #[serde(default, deserialize_with = "lenient")]
    pub recommended: bool,
    #[serde(default = "default_timeframe", deserialize_with = "lenient")]
    pub suggested_timeframe: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub agenda: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub required_attendees: Vec<String>,
}

impl Default for NextMeetingSuggestion {
    fn default() -> Self {
        Self {
            recommended: false,
            suggested_timeframe: default_timeframe(),
            agenda: Vec::new(),
            required_attendees: Vec::new(),
        }
    }
}

/// 跟进编排阶段输出
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpRecord {
    #[serde(default, deserialize_with = "lenient_list")]
    pub follow_up_actions: Vec<FollowUpAction>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub escalations: Vec<Escalation>,
    #[serde(default, deserialize_with = "lenient")]
    pub next_meeting_suggestion: NextMeetingSuggestion,
    #[serde(default, skip_serializing_if = "is_false")]
    pub parse_error: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ─── Q&A ───

pub const NO_ANSWER: &str =
    "Unable to find an answer to your question based on the meeting content.";
pub const UNPROCESSED_ANSWER: &str = "Unable to process your question.";

fn default_answer() -> String {
    NO_ANSWER.to_string()
}

/// 回答置信度，大小写不敏感，无法识别时为 Low
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    #[default]
    Low,
}

impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let level = value.as_str().map(|s| s.trim().to_lowercase());
        Ok(match level.as_deref() {
            Some("high") => Confidence::High,
            Some("medium") => Confidence::Medium,
            _ => Confidence::Low,
        })
    }
}

/// 问答阶段输出；`question` 与 `suggested_questions` 由流水线填写
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaAnswer {
    #[serde(default, deserialize_with = "lenient")]
    pub question: String,
    #[serde(default = "default_answer", deserialize_with = "lenient")]
    pub answer: String,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub relevant_context: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub related_topics: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub suggested_questions: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub parse_error: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for QaAnswer {
    fn default() -> Self {
        Self {
            question: String::new(),
            answer: default_answer(),
            confidence: Confidence::Low,
            relevant_context: Vec::new(),
            related_topics: Vec::new(),
            suggested_questions: Vec::new(),
            parse_error: false,
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_take_stage_defaults() {
        let record: UnderstandingRecord =
            serde_json::from_value(json!({"participants": ["Alice"]})).unwrap();
        assert_eq!(record.participants, vec!["Alice"]);
        assert!(record.key_points.is_empty());
        assert_eq!(record.meeting_summary, NO_SUMMARY);
        assert!(!record.parse_error);
    }

    #[test]
    fn test_wrong_types_degrade_per_field() {
        let record: UnderstandingRecord = serde_json::from_value(json!({
            "participants": 42,
            "topics": "budget",
            "decisions": ["ship it"],
            "meetingSummary": null
        }))
        .unwrap();
        assert!(record.participants.is_empty());
        assert_eq!(record.topics, vec!["budget"]);
        assert_eq!(record.decisions, vec!["ship it"]);
        assert_eq!(record.meeting_summary, "");
    }

    #[test]
    fn test_malformed_list_element_keeps_the_rest() {
        let record: ActionRecord = serde_json::from_value(json!({
            "actionItems": [
                {"task": "Send the report", "owner": "Alice"},
                "Bob to book the room",
                {"task": "Draft agenda"}
            ]
        }))
        .unwrap();
        let tasks: Vec<&str> = record.action_items.iter().map(|i| i.task.as_str()).collect();
        assert_eq!(tasks, vec!["Send the report", "Draft agenda"]);
        assert_eq!(record.action_items[0].owner.as_deref(), Some("Alice"));
        assert!(!record.parse_error);

        let record: FollowUpRecord = serde_json::from_value(json!({
            "followUpActions": [{"action": "ping"}, 7],
            "escalations": [null, {"issue": "budget"}]
        }))
        .unwrap();
        assert_eq!(record.follow_up_actions.len(), 1);
        assert_eq!(record.escalations[0].issue, "budget");
    }

    #[test]
    fn test_object_shaped_strings_are_kept_as_text() {
        let record: UnderstandingRecord = serde_json::from_value(json!({
            "participants": [{"name": "Alice", "role": "PM"}, {"name": "Bob"}, "Carol"],
            "decisions": [{"decision": "Ship Monday"}],
            "risks": [3, null, {"level": 2}]
        }))
        .unwrap();
        assert_eq!(record.participants, vec!["Alice", "Bob", "Carol"]);
        assert_eq!(record.decisions, vec!["Ship Monday"]);
        assert_eq!(record.risks, vec!["3", r#"{"level":2}"#]);
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let record: ActionRecord = serde_json::from_value(json!({
            "actionItems": [{"task": "x", "status": "pending"}],
            "source": "llm"
        }))
        .unwrap();
        assert_eq!(record.extra.get("source"), Some(&json!("llm")));
        assert_eq!(record.action_items[0].extra.get("status"), Some(&json!("pending")));

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["actionItems"][0]["status"], json!("pending"));
        assert_eq!(out["source"], json!("llm"));
        assert!(out.get("parseError").is_none());
    }

    #[test]
    fn test_lenient_id() {
        let items: Vec<ActionItem> = serde_json::from_value(json!([
            {"id": 3}, {"id": "7"}, {"id": 0}, {"id": "A1"}, {}
        ]))
        .unwrap();
        let ids: Vec<Option<u64>> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![Some(3), Some(7), None, None, None]);
    }

    #[test]
    fn test_follow_up_type_field_and_nested_defaults() {
        let record: FollowUpRecord = serde_json::from_value(json!({
            "followUpActions": [{"action": "email", "type": "Email", "urgency": "HIGH"}],
            "nextMeetingSuggestion": {"recommended": true}
        }))
        .unwrap();
        assert_eq!(record.follow_up_actions[0].kind.as_deref(), Some("Email"));
        assert!(record.next_meeting_suggestion.recommended);
        assert_eq!(
            record.next_meeting_suggestion.suggested_timeframe,
            TIMEFRAME_NOT_SPECIFIED
        );
        assert!(record.escalations.is_empty());

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["followUpActions"][0]["type"], json!("Email"));
    }

    #[test]
    fn test_confidence_case_insensitive() {
        let answer: QaAnswer =
            serde_json::from_value(json!({"answer": "yes", "confidence": "HIGH"})).unwrap();
        assert_eq!(answer.confidence, Confidence::High);
        let answer: QaAnswer =
            serde_json::from_value(json!({"confidence": "very sure"})).unwrap();
        assert_eq!(answer.confidence, Confidence::Low);
        assert_eq!(answer.answer, NO_ANSWER);
        assert_eq!(serde_json::to_value(Confidence::Medium).unwrap(), json!("medium"));
    }
}
