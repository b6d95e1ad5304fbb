//! 问答阶段：基于会议理解结果回答针对会议内容的问题

use super::schema::{QaAnswer, UnderstandingRecord, UNPROCESSED_ANSWER};
use super::{prompts, StageContext, StageRecord, Understanding};
use crate::core::PipelineError;

const MAX_SUGGESTIONS: usize = 5;

impl StageRecord for QaAnswer {
    const STAGE: &'static str = "QA";

    /// 无结构时把原文本身当作回答
    fn fallback(raw: &str) -> Self {
        let raw = raw.trim();
        Self {
            answer: if raw.is_empty() {
                UNPROCESSED_ANSWER.to_string()
            } else {
                raw.to_string()
            },
            parse_error: true,
            ..Default::default()
        }
    }
}

pub struct QaAgent {
    ctx: StageContext,
}

impl QaAgent {
    pub fn new(ctx: StageContext) -> Self {
        Self { ctx }
    }

    pub async fn run(
        &self,
        understanding: &Understanding,
        question: &str,
    ) -> Result<QaAnswer, PipelineError> {
        if question.trim().is_empty() {
            return Err(PipelineError::validation("Question is empty or invalid"));
        }
        tracing::info!("[QA] Processing question: {:?}", question);

        let prompt = prompts::qa(&understanding.data, question);
        let mut answer: QaAnswer = self.ctx.generate_record(&prompt).await?;
        answer.question = question.to_string();

        tracing::info!("[QA] Answered with {:?} confidence", answer.confidence);
        Ok(answer)
    }
}

/// 根据会议内容推荐后续可问的问题（最多 5 个）
pub fn suggest_questions(data: &UnderstandingRecord) -> Vec<String> {
    let mut suggestions = Vec::new();

    if let Some(first) = data.participants.first() {
        suggestions.push(format!("What did {} contribute to the meeting?", first));
    }
    if !data.decisions.is_empty() {
        suggestions.push("What decisions were made during the meeting?".to_string());
    }
    if !data.unresolved_issues.is_empty() {
        suggestions.push("What issues are still pending or unresolved?".to_string());
    }
    suggestions.push("What are the action items from this meeting?".to_string());
    suggestions.push("Who is responsible for each task?".to_string());

    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}
