// ==========================================
// 考场座位编排引擎 - 引擎层错误类型
// ==========================================
// 分类:
// - 用户可修正: NoActiveHalls / InsufficientCapacity / InvalidHall / DuplicateStudent
// - 内部一致性错误: SeatsExhausted（容量校验通过后不应出现）
// - 存储失败: 原样透传仓储层错误
// 冲突未完全消除不是错误，见 RunWarning
// ==========================================

use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("无可用考场: 启用考场列表为空")]
    NoActiveHalls,

    #[error("考场容量不足: 考生人数={roster_size}, 座位总数={total_capacity}")]
    InsufficientCapacity {
        roster_size: usize,
        total_capacity: usize,
    },

    #[error("考场尺寸无效: hall_id={hall_id}, rows={rows}, columns={columns}")]
    InvalidHall {
        hall_id: String,
        rows: u32,
        columns: u32,
    },

    #[error("考生重复: student_id={student_id}")]
    DuplicateStudent { student_id: String },

    #[error("座位耗尽(内部一致性错误): 已分配={placed}, 考生人数={roster_size}")]
    SeatsExhausted { placed: usize, roster_size: usize },

    #[error("结果落库失败: {0}")]
    Persistence(#[from] RepositoryError),
}

impl EngineError {
    /// 是否为用户可修正的输入问题（启用/新增考场、修正名单）
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            EngineError::NoActiveHalls
                | EngineError::InsufficientCapacity { .. }
                | EngineError::InvalidHall { .. }
                | EngineError::DuplicateStudent { .. }
        )
    }
}

// ==========================================
// EngineStage - 运行状态机
// ==========================================
// Validating → Grouping → Shuffling → Assigning → DetectingConflicts
//   → [Resolving] → Persisting → Aggregating → Completed
// 任一步骤失败 → Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStage {
    Validating,
    Grouping,
    Shuffling,
    Assigning,
    DetectingConflicts,
    Resolving,
    Persisting,
    Aggregating,
    Completed,
    Failed,
}

impl EngineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineStage::Validating => "validating",
            EngineStage::Grouping => "grouping",
            EngineStage::Shuffling => "shuffling",
            EngineStage::Assigning => "assigning",
            EngineStage::DetectingConflicts => "detecting_conflicts",
            EngineStage::Resolving => "resolving",
            EngineStage::Persisting => "persisting",
            EngineStage::Aggregating => "aggregating",
            EngineStage::Completed => "completed",
            EngineStage::Failed => "failed",
        }
    }
}

impl fmt::Display for EngineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 运行失败: 标明失败阶段与原因
#[derive(Error, Debug)]
#[error("编排运行失败 (run_id={run_id}, stage={stage}): {source}")]
pub struct RunError {
    pub run_id: String,
    pub stage: EngineStage,
    #[source]
    pub source: EngineError,
}

impl RunError {
    pub fn new(run_id: impl Into<String>, stage: EngineStage, source: EngineError) -> Self {
        Self {
            run_id: run_id.into(),
            stage,
            source,
        }
    }

    pub fn is_user_correctable(&self) -> bool {
        self.source.is_user_correctable()
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
