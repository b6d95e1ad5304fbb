//! 生成服务客户端抽象
//!
//! 所有后端（OpenAI 兼容 / DeepSeek / Mock）实现 LlmClient：generate(prompt, params) 返回原始文本。
//! 流水线从不检查 prompt 内容，只消费返回的文本。

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// 生成服务调用失败（硬失败）：不在阶段内恢复，原样向上传播
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Generation API error: {0}")]
    Api(String),

    #[error("Generation service returned no content")]
    EmptyResponse,
}

/// 生成参数（对应 config [llm.generation]）
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    /// 0.0 即贪心解码
    pub temperature: f32,
    /// 最多 4 条，超出部分不发送
    pub stop_sequences: Vec<String>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 2000,
            temperature: 0.0,
            stop_sequences: Vec::new(),
        }
    }
}

/// 生成服务客户端 trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 以单条 prompt 调用生成服务，返回原始文本
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, LlmError>;

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}
