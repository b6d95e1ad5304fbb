//! 核心编排层：错误类型、响应结构、会话缓存、流水线编排器

pub mod error;
pub mod orchestrator;
pub mod response;
pub mod session_cache;

pub use error::{ErrorResponse, PipelineError};
pub use orchestrator::{generate_session_id, Orchestrator};
pub use response::{
    ClearCacheResponse, ProcessData, ProcessMetadata, ProcessResponse, StageResponse,
};
pub use session_cache::{SessionCache, SessionCacheEntry};
