//! 会议理解阶段：整理转写稿，识别参与者、要点、决策、未决事项、风险与主题

use serde::Serialize;

use super::schema::{UnderstandingRecord, UNPARSED_SUMMARY};
use super::{prompts, StageContext, StageRecord};
use crate::core::PipelineError;

impl StageRecord for UnderstandingRecord {
    const STAGE: &'static str = "Understanding";

    fn fallback(_raw: &str) -> Self {
        Self {
            meeting_summary: UNPARSED_SUMMARY.to_string(),
            parse_error: true,
            ..Default::default()
        }
    }
}

/// 会议理解结果连同原始转写稿（后续阶段需要原文）；会话缓存保存的就是它
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Understanding {
    pub data: UnderstandingRecord,
    pub raw_transcript: String,
}

pub struct UnderstandingAgent {
    ctx: StageContext,
}

impl UnderstandingAgent {
    pub fn new(ctx: StageContext) -> Self {
        Self { ctx }
    }

    pub async fn run(&self, transcript: &str) -> Result<Understanding, PipelineError> {
        if transcript.trim().is_empty() {
            return Err(PipelineError::validation("Transcript is empty or invalid"));
        }
        tracing::info!("[Understanding] Processing transcript ({} chars)", transcript.len());

        let prompt = prompts::understanding(transcript);
        let data: UnderstandingRecord = self.ctx.generate_record(&prompt).await?;

        tracing::info!(
            "[Understanding] Structured transcript: {} participants, {} decisions",
            data.participants.len(),
            data.decisions.len()
        );
        Ok(Understanding {
            data,
            raw_transcript: transcript.to_string(),
        })
    }
}
