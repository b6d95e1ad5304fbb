//! 行动与归属阶段：抽取任务，识别负责人，标记无人负责的任务

use super::postprocess::{flag_unassigned, summarize};
use super::schema::ActionRecord;
use super::{prompts, StageContext, StageRecord, Understanding};
use crate::core::PipelineError;

impl StageRecord for ActionRecord {
    const STAGE: &'static str = "Action";

    fn fallback(_raw: &str) -> Self {
        Self {
            parse_error: true,
            ..Default::default()
        }
    }
}

pub struct ActionAgent {
    ctx: StageContext,
}

impl ActionAgent {
    pub fn new(ctx: StageContext) -> Self {
        Self { ctx }
    }

    pub async fn run(&self, understanding: &Understanding) -> Result<ActionRecord, PipelineError> {
        tracing::info!("[Action] Extracting action items...");

        let prompt = prompts::action_items(&understanding.data, &understanding.raw_transcript);
        let mut record: ActionRecord = self.ctx.generate_record(&prompt).await?;
        postprocess(&mut record);

        tracing::info!(
            "[Action] Extracted {} action items ({} flagged)",
            record.action_items.len(),
            record.summary.flagged_items
        );
        Ok(record)
    }
}

/// 归属标记并重算统计
pub fn postprocess(record: &mut ActionRecord) {
    record.action_items = flag_unassigned(std::mem::take(&mut record.action_items));
    record.summary = summarize(&record.action_items);
}
