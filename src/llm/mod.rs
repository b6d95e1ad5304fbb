//! LLM 层：生成服务客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）

pub mod deepseek;
pub mod mock;
pub mod openai;
pub mod traits;

use std::sync::Arc;

use crate::config::AppConfig;

pub use deepseek::{create_deepseek_client, DEEPSEEK_CHAT};
pub use mock::MockLlmClient;
pub use openai::{OpenAiClient, TokenUsage};
pub use traits::{GenerationParams, LlmClient, LlmError};

/// 生成服务后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    DeepSeek,
    OpenAi,
    Mock,
}

/// 按 `[llm].provider` 与可用的 API Key 选择后端
///
/// - 配置的 provider 有可用 Key 时优先使用（DeepSeek 也接受 `OPENAI_API_KEY`）
/// - 否则按已有的 Key 选择，DeepSeek 优先
/// - 没有任何 Key 时使用 Mock，输出全部走默认值
pub fn select_backend(provider: &str, deepseek_key: bool, openai_key: bool) -> Backend {
    match provider.trim().to_lowercase().as_str() {
        "deepseek" if deepseek_key || openai_key => Backend::DeepSeek,
        "openai" if openai_key => Backend::OpenAi,
        _ if deepseek_key => Backend::DeepSeek,
        _ if openai_key => Backend::OpenAi,
        _ => Backend::Mock,
    }
}

/// 根据配置与环境变量构建生成服务客户端
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let backend = select_backend(
        &cfg.llm.provider,
        std::env::var("DEEPSEEK_API_KEY").is_ok(),
        std::env::var("OPENAI_API_KEY").is_ok(),
    );

    match backend {
        Backend::DeepSeek => {
            let model = cfg.llm.deepseek.model.as_deref().unwrap_or(&cfg.llm.model);
            tracing::info!("Using DeepSeek backend ({})", model);
            Arc::new(create_deepseek_client(Some(model), cfg.llm.base_url.as_deref()))
        }
        Backend::OpenAi => {
            let model = cfg.llm.openai.model.as_deref().unwrap_or(OPENAI_DEFAULT_MODEL);
            tracing::info!("Using OpenAI-compatible backend ({})", model);
            Arc::new(OpenAiClient::new(cfg.llm.base_url.as_deref(), model, None))
        }
        Backend::Mock => {
            tracing::warn!(
                "No API key for provider {:?}, using Mock LLM (all stages return defaults)",
                cfg.llm.provider
            );
            Arc::new(MockLlmClient::new())
        }
    }
}

/// 未配置 `[llm.openai].model` 时使用的模型
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
