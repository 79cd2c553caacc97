// ==========================================
// 考场座位编排引擎 - 运行统计汇总
// ==========================================
// 纯描述性输出，不回流到分配决策
// ==========================================

use crate::domain::allocation::{Allocation, SeatConflict};
use crate::domain::student::UNASSIGNED_CLASS_GROUP;
use crate::domain::types::SeatNumbering;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// 运行统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub total_students: usize,
    pub unresolved_conflicts: usize,
    pub resolved_conflicts: usize,
    pub halls_used: usize,
    pub class_distribution: BTreeMap<String, usize>,
    pub seat_numbering: SeatNumbering,
    pub resolve_attempts: usize,
    pub derived_seed: u64,
}

pub struct MetadataAggregator;

impl MetadataAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(
        &self,
        allocations: &[Allocation],
        conflicts: &[SeatConflict],
        seat_numbering: SeatNumbering,
        resolve_attempts: usize,
        derived_seed: u64,
    ) -> RunMetadata {
        let halls_used = allocations
            .iter()
            .map(|a| a.hall_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        let mut class_distribution: BTreeMap<String, usize> = BTreeMap::new();
        for allocation in allocations {
            let key = allocation
                .class_group
                .as_deref()
                .unwrap_or(UNASSIGNED_CLASS_GROUP);
            *class_distribution.entry(key.to_string()).or_insert(0) += 1;
        }

        let resolved_conflicts = conflicts.iter().filter(|c| c.resolved).count();

        RunMetadata {
            total_students: allocations.len(),
            unresolved_conflicts: conflicts.len() - resolved_conflicts,
            resolved_conflicts,
            halls_used,
            class_distribution,
            seat_numbering,
            resolve_attempts,
            derived_seed,
        }
    }
}

impl Default for MetadataAggregator {
    fn default() -> Self {
        Self::new()
    }
}
