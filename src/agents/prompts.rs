//! 各阶段的 Prompt 模板
//!
//! 措辞不属于契约；每个模板都内嵌输入记录（JSON）与原始转写稿，并声明期望的 JSON 输出格式。

use serde::Serialize;

use super::schema::{ActionRecord, UnderstandingRecord};

const STRICT: &str =
    "[STRICT INSTRUCTION: RESPOND ONLY WITH VALID JSON. NO PREAMBLE, NO EXPLANATION, NO CONVERSATION.]";

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

pub fn understanding(transcript: &str) -> String {
    format!(
        r#"{STRICT}

You are a Meeting Understanding Agent. Analyze the meeting transcript and extract structured information:
participants, key discussion points, decisions made, unresolved issues, risks, and main topics.

TRANSCRIPT:
{transcript}

OUTPUT FORMAT (JSON):
{{
  "participants": ["participant names"],
  "keyPoints": ["main discussion points"],
  "decisions": ["decisions made"],
  "unresolvedIssues": ["pending or unresolved topics"],
  "risks": ["risks or concerns"],
  "topics": ["main topics"],
  "meetingSummary": "A brief 2-3 sentence summary"
}}

{STRICT}"#
    )
}

pub fn action_items(summary: &UnderstandingRecord, transcript: &str) -> String {
    format!(
        r#"{STRICT}

You are an Action & Ownership Agent. Extract every task, action item, or commitment from the RAW TRANSCRIPT,
using the structured summary for context. For each task determine the owner, the deadline, and the priority.
Look for phrases like "I will", "can you", "responsible for", "deadline is".
Use "UNASSIGNED" when there is no clear owner and "NO_DEADLINE" when there is no deadline.

STRUCTURED SUMMARY:
{summary}

RAW TRANSCRIPT:
{transcript}

OUTPUT FORMAT (JSON):
{{
  "actionItems": [
    {{
      "id": 1,
      "task": "Description of the task",
      "owner": "Person name or UNASSIGNED",
      "deadline": "Date/time or NO_DEADLINE",
      "priority": "high|medium|low",
      "status": "pending"
    }}
  ]
}}

{STRICT}"#,
        summary = pretty(summary),
    )
}

pub fn follow_up(summary: &UnderstandingRecord, actions: &ActionRecord, transcript: &str) -> String {
    format!(
        r#"{STRICT}

You are a Follow-Up Orchestration Agent. Based on the meeting outcomes and action items, recommend follow-up
actions, identify items that need escalation, and decide whether another meeting is needed.

STRUCTURED SUMMARY:
{summary}

ACTION ITEMS:
{actions}

RAW TRANSCRIPT:
{transcript}

OUTPUT FORMAT (JSON):
{{
  "followUpActions": [
    {{
      "id": 1,
      "action": "Description of follow-up action",
      "type": "meeting|email|escalation|reminder|review",
      "urgency": "high|medium|low",
      "suggestedDate": "recommended date or timeframe",
      "involvedParties": ["people involved"],
      "reason": "Why this follow-up is needed"
    }}
  ],
  "escalations": [
    {{ "issue": "Issue to escalate", "escalateTo": "Person or role", "reason": "Why" }}
  ],
  "nextMeetingSuggestion": {{
    "recommended": true,
    "suggestedTimeframe": "e.g. within 1 week",
    "agenda": ["agenda items"],
    "requiredAttendees": ["attendees"]
  }}
}}

{STRICT}"#,
        summary = pretty(summary),
        actions = pretty(actions),
    )
}

pub fn qa(summary: &UnderstandingRecord, question: &str) -> String {
    format!(
        r#"{STRICT}

You are a Knowledge/Q&A Agent. Answer the user's question based ONLY on the meeting content below.
If the answer is not in the meeting content, say so clearly.

MEETING CONTENT:
{summary}

USER QUESTION:
{question}

OUTPUT FORMAT (JSON):
{{
  "answer": "Your answer",
  "confidence": "high|medium|low",
  "relevantContext": ["supporting quotes or points"],
  "relatedTopics": ["related topics"]
}}

{STRICT}"#,
        summary = pretty(summary),
    )
}
