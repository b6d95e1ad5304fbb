//! DeepSeek 后端（OpenAI 兼容接口）
//!
//! 默认模型为 `deepseek-chat`：各阶段要求贪心解码并直接输出 JSON，
//! `deepseek-reasoner` 不支持 temperature，且会在正文前输出推理内容。

use crate::llm::OpenAiClient;

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEEPSEEK_CHAT: &str = "deepseek-chat";

/// 创建 DeepSeek 客户端
///
/// Key 取 `DEEPSEEK_API_KEY`，缺失时退回 `OPENAI_API_KEY`。
/// 模型按 `model` 参数、`DEEPSEEK_MODEL` 环境变量、`deepseek-chat` 的顺序决定；
/// `base_url` 用于经代理访问，缺省为官方端点。
pub fn create_deepseek_client(model: Option<&str>, base_url: Option<&str>) -> OpenAiClient {
    let api_key = std::env::var("DEEPSEEK_API_KEY")
        .or_else(|_| std::env::var("OPENAI_API_KEY"))
        .ok();

    let model = model
        .map(String::from)
        .or_else(|| std::env::var("DEEPSEEK_MODEL").ok())
        .unwrap_or_else(|| DEEPSEEK_CHAT.to_string());

    OpenAiClient::new(
        Some(base_url.unwrap_or(DEEPSEEK_BASE_URL)),
        &model,
        api_key.as_deref(),
    )
}
