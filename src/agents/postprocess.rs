//! 确定性后处理：归属标记（Action 阶段）与优先级评分（Follow-Up 阶段）
//!
//! 均为纯函数；序号按输入下标补齐（1 起），已有序号不改，对同一列表重复执行结果不变。

use super::schema::{ActionItem, ActionSummary, FollowUpAction};

pub const UNASSIGNED: &str = "UNASSIGNED";
pub const UNASSIGNED_REASON: &str = "No owner assigned to this task";

/// owner 缺失、空白，或（不区分大小写）为 UNASSIGNED / TBD / UNKNOWN 时视为未分配
pub fn is_unassigned(owner: Option<&str>) -> bool {
    match owner.map(str::trim) {
        None | Some("") => true,
        Some(o) => ["unassigned", "tbd", "unknown"]
            .iter()
            .any(|p| o.eq_ignore_ascii_case(p)),
    }
}

/// 标记未分配的行动项并补齐序号
pub fn flag_unassigned(items: Vec<ActionItem>) -> Vec<ActionItem> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, mut item)| {
            item.id = Some(item.id.unwrap_or(index as u64 + 1));
            if is_unassigned(item.owner.as_deref()) {
                item.owner = Some(UNASSIGNED.to_string());
                item.flagged = true;
                item.flag_reason = Some(UNASSIGNED_REASON.to_string());
            } else {
                item.flagged = false;
                item.flag_reason = None;
            }
            item
        })
        .collect()
}

/// 根据（已标记的）行动项统计总数 / 已分配 / 未分配 / 被标记数
pub fn summarize(items: &[ActionItem]) -> ActionSummary {
    let unassigned = items
        .iter()
        .filter(|i| is_unassigned(i.owner.as_deref()))
        .count();
    ActionSummary {
        total_tasks: items.len(),
        assigned_tasks: items.len() - unassigned,
        unassigned_tasks: unassigned,
        flagged_items: items.iter().filter(|i| i.flagged).count(),
    }
}

/// 紧急度权重：high 3 / medium 2 / low 1，其他或缺失为 1
pub fn urgency_weight(urgency: Option<&str>) -> u32 {
    match urgency.map(|u| u.trim().to_lowercase()).as_deref() {
        Some("high") => 3,
        Some("medium") => 2,
        _ => 1,
    }
}

/// 类型权重：escalation 3 / meeting 2 / email、reminder、review 1，其他或缺失为 1
pub fn type_weight(kind: Option<&str>) -> u32 {
    match kind.map(|k| k.trim().to_lowercase()).as_deref() {
        Some("escalation") => 3,
        Some("meeting") => 2,
        _ => 1,
    }
}

pub fn priority_score(action: &FollowUpAction) -> u32 {
    urgency_weight(action.urgency.as_deref()) * 2 + type_weight(action.kind.as_deref())
}

/// 计算优先级分并按分数降序稳定排序，同分保持输入顺序
pub fn prioritize(actions: Vec<FollowUpAction>) -> Vec<FollowUpAction> {
    let mut scored: Vec<FollowUpAction> = actions
        .into_iter()
        .enumerate()
        .map(|(index, mut action)| {
            action.id = Some(action.id.unwrap_or(index as u64 + 1));
            action.priority_score = priority_score(&action);
            action
        })
        .collect();
    scored.sort_by(|a, b| b.priority_score.cmp(&a.priority_score));
    scored
}
