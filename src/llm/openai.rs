//! OpenAI 兼容 API 客户端
//!
//! 通过 async_openai 调用任意 OpenAI 兼容端点（可配置 base_url）；支持 DeepSeek、OpenAI、自建代理等。
//! 整条 prompt 作为单条 user 消息发送，取首个 choice 的文本。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs, StopConfiguration,
};
use async_openai::Client;
use async_trait::async_trait;

use crate::llm::{GenerationParams, LlmClient, LlmError};

/// Token 使用统计（累计值）
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: Arc<AtomicU64>,
    pub completion_tokens: Arc<AtomicU64>,
    pub total_tokens: Arc<AtomicU64>,
}

impl TokenUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, prompt: u64, completion: u64) {
        self.prompt_tokens.fetch_add(prompt, Ordering::Relaxed);
        self.completion_tokens.fetch_add(completion, Ordering::Relaxed);
        self.total_tokens.fetch_add(prompt + completion, Ordering::Relaxed);
    }

    pub fn get(&self) -> (u64, u64, u64) {
        (
            self.prompt_tokens.load(Ordering::Relaxed),
            self.completion_tokens.load(Ordering::Relaxed),
            self.total_tokens.load(Ordering::Relaxed),
        )
    }
}

/// OpenAI 兼容客户端：持有 Client 与 model 名
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
    /// 累计 token 使用统计
    pub usage: TokenUsage,
}

impl OpenAiClient {
    pub fn new(base_url: Option<&str>, model: &str, api_key: Option<&str>) -> Self {
        let api_key = api_key
            .map(String::from)
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .unwrap_or_else(|| "sk-placeholder".to_string());

        let config = if let Some(url) = base_url {
            OpenAIConfig::new().with_api_base(url).with_api_key(api_key)
        } else {
            OpenAIConfig::new().with_api_key(api_key)
        };

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
            usage: TokenUsage::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// chat API 接受的 stop 序列上限
const MAX_STOP_SEQUENCES: usize = 4;

/// 构建单轮请求：prompt 作为唯一的 user 消息
fn build_request(
    model: &str,
    prompt: &str,
    params: &GenerationParams,
) -> Result<CreateChatCompletionRequest, LlmError> {
    let message = ChatCompletionRequestUserMessageArgs::default()
        .content(prompt.to_string())
        .build()
        .map_err(map_openai_error)?;

    let mut builder = CreateChatCompletionRequestArgs::default();
    builder
        .model(model)
        .messages(vec![ChatCompletionRequestMessage::User(message)])
        .max_completion_tokens(params.max_new_tokens)
        .temperature(params.temperature);

    if !params.stop_sequences.is_empty() {
        if params.stop_sequences.len() > MAX_STOP_SEQUENCES {
            tracing::warn!(
                "Only the first {} stop sequences are sent, {} configured",
                MAX_STOP_SEQUENCES,
                params.stop_sequences.len()
            );
        }
        let stop: Vec<String> = params
            .stop_sequences
            .iter()
            .take(MAX_STOP_SEQUENCES)
            .cloned()
            .collect();
        builder.stop(StopConfiguration::StringArray(stop));
    }

    builder.build().map_err(map_openai_error)
}

/// 将 async_openai 错误映射为流水线的硬失败分类
fn map_openai_error(err: OpenAIError) -> LlmError {
    match err {
        OpenAIError::ApiError(api) => {
            let text = api.to_string();
            if looks_like_auth_failure(&text) {
                LlmError::Authentication(text)
            } else {
                LlmError::Api(text)
            }
        }
        OpenAIError::InvalidArgument(msg) => LlmError::Api(msg),
        other => LlmError::Transport(other.to_string()),
    }
}

fn looks_like_auth_failure(text: &str) -> bool {
    let lower = text.to_lowercase();
    ["api key", "unauthorized", "authentication", "401"]
        .iter()
        .any(|needle| lower.contains(needle))
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn token_usage(&self) -> (u64, u64, u64) {
        self.usage.get()
    }

    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, LlmError> {
        let request = build_request(&self.model, prompt, params)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        if let Some(usage) = &response.usage {
            self.usage.add(
                usage.prompt_tokens as u64,
                usage.completion_tokens as u64,
            );
        }

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or(LlmError::EmptyResponse)
    }
}
