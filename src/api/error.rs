// ==========================================
// 考场座位编排引擎 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换下层错误为用户友好的错误消息
// ==========================================

use crate::engine::error::RunError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
/// 所有错误信息必须包含显式原因
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 编排错误
    // ==========================================
    /// 输入可修正（启用/新增考场、修正名单后重试）
    #[error("编排被拒绝 (run_id={run_id}, stage={stage}): {reason}")]
    AllocationRejected {
        run_id: String,
        stage: String,
        reason: String,
    },

    /// 内部一致性错误或落库失败
    #[error("编排失败 (run_id={run_id}, stage={stage}): {reason}")]
    AllocationFailed {
        run_id: String,
        stage: String,
        reason: String,
    },

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 导入/配置错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("配置读取失败: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 调用方能否通过修正输入解决
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            ApiError::AllocationRejected { .. }
                | ApiError::InvalidInput(_)
                | ApiError::NotFound(_)
                | ApiError::ImportError(_)
        )
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
        }
    }
}

// ==========================================
// 从 RunError 转换
// ==========================================
impl From<RunError> for ApiError {
    fn from(err: RunError) -> Self {
        let run_id = err.run_id.clone();
        let stage = err.stage.to_string();
        let reason = err.source.to_string();
        if err.is_user_correctable() {
            ApiError::AllocationRejected {
                run_id,
                stage,
                reason,
            }
        } else {
            ApiError::AllocationFailed {
                run_id,
                stage,
                reason,
            }
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Repository(e) => ApiError::from(e),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
