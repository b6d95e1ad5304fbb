//! Scribe - 会议纪要分析流水线
//!
//! 把会议转写文本依次交给生成服务处理，得到结构化结果：
//! 理解（摘要、决策、风险）→ 行动项（负责人、截止时间）→ 跟进建议（优先级排序、升级、下次会议），
//! 以及基于会话缓存的问答。生成服务的输出不可信，统一经过恢复式 JSON 提取与逐字段默认值填充。
//!
//! 模块划分：
//! - **agents**: 四个处理阶段、输出结构、Prompt 与确定性后处理
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 编排器、会话缓存、错误与响应结构
//! - **extract**: 从自由文本中恢复 JSON 值
//! - **llm**: 生成服务客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）
//! - **observability**: 日志初始化

pub mod agents;
pub mod config;
pub mod core;
pub mod extract;
pub mod llm;
pub mod observability;

pub use crate::core::{Orchestrator, PipelineError, SessionCache};
