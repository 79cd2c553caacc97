// ==========================================
// 考场座位编排引擎 - 座位冲突修复
// ==========================================
// 仅在 adjacency_strictness == hard 且存在冲突时调用
// 有界贪心局部搜索（尽力而为，不保证清零）:
// 1) 取队首冲突，在同考场内随机选一名不同班级的考生，交换二者座位
// 2) 交换后对全部分配记录重新检测（非增量）
// 3) 队首冲突无可交换对象时轮转到队尾
// 4) 尝试次数上限 MAX_RESOLVE_ATTEMPTS
// ==========================================

use crate::domain::allocation::{swap_seats, Allocation, SeatConflict};
use crate::engine::conflict_detector::ConflictDetector;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, instrument};

/// 单次运行冲突修复尝试次数上限
pub const MAX_RESOLVE_ATTEMPTS: usize = 1000;

/// 冲突修复结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveReport {
    pub attempts: usize,
    pub swaps: usize,
    pub remaining: Vec<SeatConflict>,
}

impl ResolveReport {
    pub fn is_clean(&self) -> bool {
        self.remaining.is_empty()
    }
}

pub struct ConflictResolver {
    detector: ConflictDetector,
    max_attempts: usize,
}

impl ConflictResolver {
    /// 上限会被限制在 1..=MAX_RESOLVE_ATTEMPTS
    pub fn new(max_attempts: usize) -> Self {
        Self {
            detector: ConflictDetector::new(),
            max_attempts: max_attempts.clamp(1, MAX_RESOLVE_ATTEMPTS),
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// 执行冲突修复（原地修改 allocations 的座位）
    ///
    /// 剩余冲突轮转一整圈均无可交换对象时提前结束，之后不再计入 attempts，
    /// 因此 attempts 可能小于上限而冲突仍未清零
    #[instrument(skip_all, fields(
        allocations_count = allocations.len(),
        initial_conflicts = conflicts.len(),
        max_attempts = self.max_attempts
    ))]
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        allocations: &mut [Allocation],
        conflicts: Vec<SeatConflict>,
        rng: &mut R,
    ) -> ResolveReport {
        let mut queue: VecDeque<SeatConflict> = conflicts.into();
        let mut attempts = 0usize;
        let mut swaps = 0usize;
        // 连续无可交换对象的次数；等于队列长度时说明整轮无进展
        let mut stalled = 0usize;

        while attempts < self.max_attempts {
            let Some(head) = queue.front() else {
                break;
            };
            attempts += 1;

            let target = head.allocation_ref;
            let candidates = self.swap_candidates(allocations, target);

            match candidates.choose(rng) {
                Some(&other) => {
                    swap_seats(allocations, target, other);
                    swaps += 1;
                    stalled = 0;
                    queue = self.detector.detect(allocations).into();
                }
                None => {
                    stalled += 1;
                    if stalled >= queue.len() {
                        debug!(attempts, "所有剩余冲突均无可交换对象，提前结束");
                        break;
                    }
                    queue.rotate_left(1);
                }
            }
        }

        let remaining = self.detector.detect(allocations);
        debug!(attempts, swaps, remaining = remaining.len(), "冲突修复结束");

        ResolveReport {
            attempts,
            swaps,
            remaining,
        }
    }

    /// 同考场、不同班级的全部分配记录（按 arena 顺序）
    fn swap_candidates(&self, allocations: &[Allocation], target: usize) -> Vec<usize> {
        let subject = &allocations[target];
        allocations
            .iter()
            .enumerate()
            .filter(|(i, a)| {
                *i != target && a.hall_id == subject.hall_id && a.class_group != subject.class_group
            })
            .map(|(i, _)| i)
            .collect()
    }
}

impl Default for ConflictResolver {
    fn default() -> Self {
        Self::new(MAX_RESOLVE_ATTEMPTS)
    }
}
