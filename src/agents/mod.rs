//! 抽取阶段（Agent）：会议理解 → 行动与归属 → 跟进编排；问答仅依赖会议理解
//!
//! 所有阶段遵循同一契约：构造 prompt → 调用生成服务 → 结构恢复 → 缺失字段补默认值 → 阶段后处理。
//! - 结构恢复失败为软失败：返回全默认记录并标记 `parse_error`，流水线继续
//! - 生成服务报错为硬失败：不在阶段内捕获，直接向上传播

pub mod action;
pub mod follow_up;
pub mod postprocess;
pub mod prompts;
pub mod qa;
pub mod schema;
pub mod understanding;

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::extract::RecoveryExtractor;
use crate::llm::{GenerationParams, LlmClient, LlmError};

pub use action::ActionAgent;
pub use follow_up::FollowUpAgent;
pub use qa::{suggest_questions, QaAgent};
pub use schema::{
    ActionItem, ActionRecord, ActionSummary, Confidence, Escalation, FollowUpAction,
    FollowUpRecord, NextMeetingSuggestion, QaAnswer, UnderstandingRecord,
};
pub use understanding::{Understanding, UnderstandingAgent};

/// 阶段输出记录：可从恢复出的 JSON 反序列化，并能在恢复失败时构造全默认记录
pub trait StageRecord: DeserializeOwned {
    /// 阶段名（日志用）
    const STAGE: &'static str;

    /// 恢复失败时的记录，`parse_error = true`；`raw` 为生成服务原文
    fn fallback(raw: &str) -> Self;
}

/// 从原文恢复阶段记录；无结构或形状不符时退回 `fallback`
pub fn recover<T: StageRecord>(extractor: &RecoveryExtractor, raw: &str) -> T {
    let Some(value) = extractor.extract(raw) else {
        tracing::warn!("[{}] No recoverable structure in response, using defaults", T::STAGE);
        return T::fallback(raw);
    };
    match serde_json::from_value::<T>(value) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(
                "[{}] Recovered value does not match schema ({}), using defaults",
                T::STAGE,
                e
            );
            T::fallback(raw)
        }
    }
}

/// 各阶段共享的依赖：生成服务客户端、生成参数、抽取器
#[derive(Clone)]
pub struct StageContext {
    llm: Arc<dyn LlmClient>,
    params: GenerationParams,
    extractor: RecoveryExtractor,
}

impl StageContext {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            params: GenerationParams::default(),
            extractor: RecoveryExtractor::default(),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_extractor(mut self, extractor: RecoveryExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// 调用生成服务并恢复为阶段记录；只有生成服务本身的错误会返回 Err
    pub async fn generate_record<T: StageRecord>(&self, prompt: &str) -> Result<T, LlmError> {
        let raw = self.llm.generate(prompt, &self.params).await?;
        tracing::debug!("[{}] Received {} bytes from generation service", T::STAGE, raw.len());
        Ok(recover(&self.extractor, &raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    #[test]
    fn test_recover_array_for_object_stage_falls_back() {
        let record: UnderstandingRecord = recover(&RecoveryExtractor::default(), "[1, 2]");
        assert!(record.parse_error);
        assert_eq!(record.meeting_summary, schema::UNPARSED_SUMMARY);
    }

    #[tokio::test]
    async fn test_generate_record_propagates_client_error() {
        let mock = Arc::new(MockLlmClient::new());
        mock.push_error(LlmError::Authentication("expired".into()));
        let ctx = StageContext::new(mock);
        let result = ctx.generate_record::<ActionRecord>("prompt").await;
        assert_eq!(result, Err(LlmError::Authentication("expired".into())));
    }
}
