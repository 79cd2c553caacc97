// ==========================================
// 考场座位编排引擎 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行/上层应用调用
// ==========================================

pub mod allocation_api;
pub mod error;
pub mod import_api;

// 重导出核心类型
pub use allocation_api::{AllocationApi, CreateRunRequest, RunResultView};
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportApiResponse};
