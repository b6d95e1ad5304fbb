//! 跟进编排阶段：建议后续会议与跟进动作，升级待决事项，并按优先级排序

use super::postprocess::prioritize;
use super::schema::{ActionRecord, FollowUpRecord, NextMeetingSuggestion, TIMEFRAME_UNDETERMINED};
use super::{prompts, StageContext, StageRecord, Understanding};
use crate::core::PipelineError;

impl StageRecord for FollowUpRecord {
    const STAGE: &'static str = "FollowUp";

    fn fallback(_raw: &str) -> Self {
        Self {
            next_meeting_suggestion: NextMeetingSuggestion {
                suggested_timeframe: TIMEFRAME_UNDETERMINED.to_string(),
                ..Default::default()
            },
            parse_error: true,
            ..Default::default()
        }
    }
}

pub struct FollowUpAgent {
    ctx: StageContext,
}

impl FollowUpAgent {
    pub fn new(ctx: StageContext) -> Self {
        Self { ctx }
    }

    pub async fn run(
        &self,
        understanding: &Understanding,
        actions: &ActionRecord,
    ) -> Result<FollowUpRecord, PipelineError> {
        tracing::info!("[FollowUp] Generating follow-up recommendations...");

        let prompt = prompts::follow_up(&understanding.data, actions, &understanding.raw_transcript);
        let mut record: FollowUpRecord = self.ctx.generate_record(&prompt).await?;
        record.follow_up_actions = prioritize(std::mem::take(&mut record.follow_up_actions));

        tracing::info!(
            "[FollowUp] Generated {} follow-up actions, {} escalations",
            record.follow_up_actions.len(),
            record.escalations.len()
        );
        Ok(record)
    }
}
