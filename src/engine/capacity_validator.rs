// ==========================================
// 考场座位编排引擎 - 容量校验
// ==========================================
// 红线: 任何分配工作开始前，启用考场的座位总数必须 >= 考生人数
// 输入: 考场列表 + 考生名单
// 输出: 容量报告（无副作用）
// ==========================================

use crate::domain::hall::{Hall, SeatCapacity};
use crate::domain::student::Student;
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::instrument;

/// 容量校验结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityReport {
    pub active_halls: usize,
    pub total_capacity: usize,
    pub roster_size: usize,
}

impl CapacityReport {
    pub fn spare_seats(&self) -> usize {
        self.total_capacity.saturating_sub(self.roster_size)
    }
}

// ==========================================
// CapacityValidator - 容量校验器
// ==========================================
pub struct CapacityValidator {
    // 无状态校验器
}

impl CapacityValidator {
    pub fn new() -> Self {
        Self {}
    }

    /// 启用考场的座位总数
    pub fn total_capacity(&self, halls: &[Hall]) -> usize {
        halls
            .iter()
            .filter(|h| h.active)
            .map(|h| h.capacity())
            .sum()
    }

    /// 校验考场容量
    ///
    /// 顺序:
    /// 1) 无启用考场 → NoActiveHalls
    /// 2) 启用考场行列非正 → InvalidHall
    /// 3) 座位总数 < 考生人数 → InsufficientCapacity
    #[instrument(skip(self, halls), fields(halls_count = halls.len()))]
    pub fn validate(&self, halls: &[Hall], roster_size: usize) -> EngineResult<CapacityReport> {
        let active: Vec<&Hall> = halls.iter().filter(|h| h.active).collect();
        if active.is_empty() {
            return Err(EngineError::NoActiveHalls);
        }

        if let Some(bad) = active.iter().find(|h| !h.has_valid_shape()) {
            return Err(EngineError::InvalidHall {
                hall_id: bad.hall_id.clone(),
                rows: bad.rows,
                columns: bad.columns,
            });
        }

        let total_capacity = self.total_capacity(halls);
        if total_capacity < roster_size {
            return Err(EngineError::InsufficientCapacity {
                roster_size,
                total_capacity,
            });
        }

        Ok(CapacityReport {
            active_halls: active.len(),
            total_capacity,
            roster_size,
        })
    }

    /// 校验名单: 同一考生不得出现两次（一人一座）
    pub fn validate_roster(&self, roster: &[Student]) -> EngineResult<()> {
        let mut seen = HashSet::with_capacity(roster.len());
        for student in roster {
            if !seen.insert(student.student_id.as_str()) {
                return Err(EngineError::DuplicateStudent {
                    student_id: student.student_id.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Default for CapacityValidator {
    fn default() -> Self {
        Self::new()
    }
}
