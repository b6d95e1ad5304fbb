//! 对外响应结构（序列化为 camelCase JSON）

use serde::Serialize;

use crate::agents::{ActionRecord, FollowUpRecord, UnderstandingRecord};

/// 单阶段接口的响应信封
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> StageResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessData {
    pub summary: UnderstandingRecord,
    pub action_items: ActionRecord,
    pub follow_ups: FollowUpRecord,
}

/// 从各阶段输出直接读取的派生统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMetadata {
    pub participant_count: usize,
    pub action_item_count: usize,
    pub follow_up_count: usize,
    pub has_escalations: bool,
    pub next_meeting_recommended: bool,
}

impl ProcessMetadata {
    pub fn from_records(
        summary: &UnderstandingRecord,
        actions: &ActionRecord,
        follow_ups: &FollowUpRecord,
    ) -> Self {
        Self {
            participant_count: summary.participants.len(),
            action_item_count: actions.action_items.len(),
            follow_up_count: follow_ups.follow_up_actions.len(),
            has_escalations: !follow_ups.escalations.is_empty(),
            next_meeting_recommended: follow_ups.next_meeting_suggestion.recommended,
        }
    }
}

/// 完整流水线（理解 → 行动 → 跟进）的响应
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub success: bool,
    pub session_id: String,
    /// 形如 "1234ms"
    pub processing_time: String,
    pub data: ProcessData,
    pub metadata: ProcessMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearCacheResponse {
    pub success: bool,
    pub message: String,
}
