//! 流水线编排器
//!
//! 按数据依赖顺序串行执行各阶段：理解 → 行动（依赖理解）→ 跟进（依赖理解与行动）；问答只依赖理解。
//! 同一次调用内各阶段严格串行；不同调用可并发，共享同一个会话缓存。
//! 生成服务调用没有超时与取消，挂起的外部调用会一直阻塞该次调用。

use std::sync::Arc;
use std::time::Instant;

use crate::agents::{
    suggest_questions, ActionAgent, ActionRecord, FollowUpAgent, FollowUpRecord, QaAgent,
    QaAnswer, StageContext, Understanding, UnderstandingAgent, UnderstandingRecord,
};
use crate::config::AppConfig;
use crate::core::{
    ClearCacheResponse, PipelineError, ProcessData, ProcessMetadata, ProcessResponse,
    SessionCache, StageResponse,
};
use crate::extract::RecoveryExtractor;
use crate::llm::LlmClient;

/// 生成会话 ID：毫秒时间戳 + 随机后缀（概率唯一，仅作缓存键）
pub fn generate_session_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "session_{}_{}",
        chrono::Utc::now().timestamp_millis(),
        &suffix[..9]
    )
}

fn require(value: &str, what: &str) -> Result<(), PipelineError> {
    if value.trim().is_empty() {
        return Err(PipelineError::validation(format!("{} is required", what)));
    }
    Ok(())
}

/// 编排器：持有四个阶段与会话缓存，依赖全部由构造方注入
pub struct Orchestrator {
    understanding: UnderstandingAgent,
    action: ActionAgent,
    follow_up: FollowUpAgent,
    qa: QaAgent,
    cache: Arc<SessionCache>,
}

impl Orchestrator {
    pub fn new(ctx: StageContext, cache: Arc<SessionCache>) -> Self {
        Self {
            understanding: UnderstandingAgent::new(ctx.clone()),
            action: ActionAgent::new(ctx.clone()),
            follow_up: FollowUpAgent::new(ctx.clone()),
            qa: QaAgent::new(ctx),
            cache,
        }
    }

    /// 按配置构建：生成参数、候选块上限、缓存 TTL 与容量
    pub fn from_config(cfg: &AppConfig, llm: Arc<dyn LlmClient>) -> Self {
        let ctx = StageContext::new(llm)
            .with_params(cfg.llm.generation.clone())
            .with_extractor(RecoveryExtractor::new(cfg.extract.max_candidates));
        let cache = Arc::new(SessionCache::new(cfg.cache.ttl(), cfg.cache.capacity));
        Self::new(ctx, cache)
    }

    pub fn cache(&self) -> &Arc<SessionCache> {
        &self.cache
    }

    /// 命中新鲜缓存则直接返回，否则运行理解阶段；提供了 session_id 时写入缓存
    pub async fn get_or_compute(
        &self,
        session_id: Option<&str>,
        transcript: &str,
    ) -> Result<Understanding, PipelineError> {
        if let Some(id) = session_id {
            if let Some(cached) = self.cache.get(id).await {
                tracing::info!("[Orchestrator] Using cached transcript for session {}", id);
                return Ok(cached);
            }
        }

        let understanding = self.understanding.run(transcript).await?;
        if let Some(id) = session_id {
            self.cache.insert(id, understanding.clone()).await;
        }
        Ok(understanding)
    }

    /// 完整流水线：理解 → 行动 → 跟进；提供了 session_id 时缓存理解结果
    pub async fn process(
        &self,
        transcript: &str,
        session_id: Option<&str>,
    ) -> Result<ProcessResponse, PipelineError> {
        require(transcript, "Transcript")?;
        tracing::info!("[Orchestrator] Starting complete meeting processing...");
        let start = Instant::now();

        let result = self.run_all(transcript, session_id).await;
        let (session_id, understanding, actions, follow_ups) = match result {
            Ok(v) => v,
            Err(e) => {
                tracing::error!("[Orchestrator] Error in complete processing: {}", e);
                return Err(e);
            }
        };

        let elapsed = start.elapsed().as_millis();
        tracing::info!("[Orchestrator] Complete processing finished in {}ms", elapsed);

        let metadata = ProcessMetadata::from_records(&understanding.data, &actions, &follow_ups);
        Ok(ProcessResponse {
            success: true,
            session_id,
            processing_time: format!("{}ms", elapsed),
            data: ProcessData {
                summary: understanding.data,
                action_items: actions,
                follow_ups,
            },
            metadata,
        })
    }

    async fn run_all(
        &self,
        transcript: &str,
        session_id: Option<&str>,
    ) -> Result<(String, Understanding, ActionRecord, FollowUpRecord), PipelineError> {
        tracing::info!("[Orchestrator] Step 1/3: Understanding");
        let understanding = self.understanding.run(transcript).await?;
        // 只缓存调用方提供的会话，匿名调用不占用缓存容量
        let session_id = match session_id {
            Some(id) => {
                self.cache.insert(id, understanding.clone()).await;
                id.to_string()
            }
            None => generate_session_id(),
        };

        tracing::info!("[Orchestrator] Step 2/3: Action items");
        let actions = self.action.run(&understanding).await?;

        tracing::info!("[Orchestrator] Step 3/3: Follow-ups");
        let follow_ups = self.follow_up.run(&understanding, &actions).await?;

        Ok((session_id, understanding, actions, follow_ups))
    }

    pub async fn summary(
        &self,
        transcript: &str,
    ) -> Result<StageResponse<UnderstandingRecord>, PipelineError> {
        require(transcript, "Transcript")?;
        let understanding = self.understanding.run(transcript).await?;
        Ok(StageResponse::ok(understanding.data))
    }

    pub async fn actions(&self, transcript: &str) -> Result<StageResponse<ActionRecord>, PipelineError> {
        require(transcript, "Transcript")?;
        let understanding = self.understanding.run(transcript).await?;
        let actions = self.action.run(&understanding).await?;
        Ok(StageResponse::ok(actions))
    }

    /// 跟进建议；传入预先计算的行动项时跳过行动阶段
    pub async fn followups(
        &self,
        transcript: &str,
        actions: Option<ActionRecord>,
    ) -> Result<StageResponse<FollowUpRecord>, PipelineError> {
        require(transcript, "Transcript")?;
        let understanding = self.understanding.run(transcript).await?;
        let actions = match actions {
            Some(a) => a,
            None => self.action.run(&understanding).await?,
        };
        let follow_ups = self.follow_up.run(&understanding, &actions).await?;
        Ok(StageResponse::ok(follow_ups))
    }

    /// 问答：会话缓存新鲜时复用理解结果，并附带推荐问题
    pub async fn qa(
        &self,
        transcript: &str,
        question: &str,
        session_id: Option<&str>,
    ) -> Result<StageResponse<QaAnswer>, PipelineError> {
        require(transcript, "Transcript")?;
        require(question, "Question")?;

        let understanding = self.get_or_compute(session_id, transcript).await?;
        let mut answer = self.qa.run(&understanding, question).await?;
        answer.suggested_questions = suggest_questions(&understanding.data);
        Ok(StageResponse::ok(answer))
    }

    /// 清除指定会话的缓存；未指定时清空全部
    pub async fn clear_cache(&self, session_id: Option<&str>) -> ClearCacheResponse {
        let message = match session_id {
            Some(id) => {
                self.cache.remove(id).await;
                format!("Cache cleared for session {}", id)
            }
            None => {
                let n = self.cache.clear().await;
                format!("Cache cleared for all sessions ({} entries)", n)
            }
        };
        tracing::info!("[Orchestrator] {}", message);
        ClearCacheResponse {
            success: true,
            message,
        }
    }
}
