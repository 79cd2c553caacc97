// ==========================================
// 考场座位编排引擎 - 编排运行领域模型
// ==========================================
// 幂等单元: 同一 seed + 同一名单顺序 + 同一考场顺序 => 同一洗牌结果
// ==========================================

use crate::domain::types::{AdjacencyStrictness, RunStatus, SeatNumbering};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// AllocationRun - 编排运行
// ==========================================
// 在引擎启动前创建; completed_at 在成功落库前为 None
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRun {
    pub run_id: String,
    pub exam_id: String,

    // ===== 运行参数 =====
    pub seed: String,                               // PRNG 的确定性输入
    pub seat_numbering: SeatNumbering,              // 座位编号策略
    pub adjacency_strictness: AdjacencyStrictness,  // 相邻约束强度

    // ===== 生命周期 =====
    pub status: RunStatus,
    pub config_snapshot_json: Option<String>, // 创建时的配置快照
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl AllocationRun {
    /// 创建待执行的运行（run_id 使用 uuid v4）
    pub fn new(
        exam_id: impl Into<String>,
        seed: impl Into<String>,
        seat_numbering: SeatNumbering,
        adjacency_strictness: AdjacencyStrictness,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            exam_id: exam_id.into(),
            seed: seed.into(),
            seat_numbering,
            adjacency_strictness,
            status: RunStatus::Pending,
            config_snapshot_json: None,
            failure_reason: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed && self.completed_at.is_some()
    }
}
