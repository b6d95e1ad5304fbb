//! 流水线错误类型
//!
//! - Validation：转写稿 / 问题为空，调用生成服务前即拒绝，可由调用方修正
//! - Generation：生成服务调用失败（鉴权 / 网络），整次调用失败，原样传播
//!
//! 结构恢复失败不是错误：阶段以默认值补齐并标记 `parse_error`，流水线继续。

use serde::Serialize;
use thiserror::Error;

use crate::llm::LlmError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Generation(#[from] LlmError),
}

impl PipelineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        PipelineError::Validation(msg.into())
    }

    /// 是否为调用方可修正的输入错误（区别于服务故障）
    pub fn is_user_error(&self) -> bool {
        matches!(self, PipelineError::Validation(_))
    }
}

/// 硬失败时返回给调用方的信封
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl From<&PipelineError> for ErrorResponse {
    fn from(err: &PipelineError) -> Self {
        let error = match err {
            PipelineError::Validation(msg) => msg.clone(),
            PipelineError::Generation(_) => "Generation service failure".to_string(),
        };
        Self {
            success: false,
            error,
            message: err.to_string(),
        }
    }
}
