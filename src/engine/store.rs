// ==========================================
// 考场座位编排引擎 - 结果落库接口
// ==========================================
// 职责: 定义"提交一次完成的运行"接口，实现依赖倒置
// 说明: Engine 层定义 trait，Repository 层提供 SQLite 实现
// 红线: 整批原子提交，不存在增量写入；失败时不得残留任何行
// ==========================================

use crate::domain::allocation::{Allocation, SeatConflict};
use crate::domain::run::AllocationRun;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

/// 一次运行的完整提交批次
#[derive(Debug, Clone)]
pub struct RunCommit<'a> {
    pub run: &'a AllocationRun,
    pub allocations: &'a [Allocation],
    pub conflicts: &'a [SeatConflict],
    pub completed_at: DateTime<Utc>,
}

/// 运行结果存储 Trait
///
/// # 实现说明
/// - `AllocationRepository`（SQLite 单事务）
/// - `MemoryAllocationStore`（进程内，用于试算/单元测试）
pub trait AllocationStore: Send + Sync {
    /// 原子提交一次运行的全部分配与冲突
    ///
    /// # 返回
    /// - `Ok(ids)`: 持久化分配 ID，下标与 `allocations` 一一对应
    /// - `Err`: 整批回滚
    fn commit_run(&self, commit: &RunCommit<'_>) -> RepositoryResult<Vec<i64>>;
}

/// 已提交的运行快照（内存存储）
#[derive(Debug, Clone)]
pub struct CommittedRun {
    pub run_id: String,
    pub allocations: Vec<Allocation>,
    pub conflicts: Vec<SeatConflict>,
    pub completed_at: DateTime<Utc>,
}

// ==========================================
// MemoryAllocationStore - 进程内存储
// ==========================================
#[derive(Debug, Default)]
pub struct MemoryAllocationStore {
    runs: Mutex<HashMap<String, CommittedRun>>,
    next_id: AtomicI64,
}

impl MemoryAllocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, run_id: &str) -> Option<CommittedRun> {
        self.runs.lock().ok()?.get(run_id).cloned()
    }

    pub fn run_count(&self) -> usize {
        self.runs.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// 与 SQLite 唯一约束口径一致的批次校验
    fn check_batch(commit: &RunCommit<'_>) -> RepositoryResult<()> {
        let mut seats = HashSet::new();
        let mut students = HashSet::new();
        for a in commit.allocations {
            if !seats.insert((a.hall_id.as_str(), a.row, a.column)) {
                return Err(RepositoryError::UniqueConstraintViolation(format!(
                    "座位重复: hall_id={}, row={}, column={}",
                    a.hall_id, a.row, a.column
                )));
            }
            if !students.insert(a.student_id.as_str()) {
                return Err(RepositoryError::UniqueConstraintViolation(format!(
                    "考生重复: student_id={}",
                    a.student_id
                )));
            }
        }

        let len = commit.allocations.len();
        if let Some(c) = commit
            .conflicts
            .iter()
            .find(|c| c.allocation_ref >= len || c.conflicting_allocation_ref >= len)
        {
            return Err(RepositoryError::ForeignKeyViolation(format!(
                "冲突引用越界: ({}, {})",
                c.allocation_ref, c.conflicting_allocation_ref
            )));
        }
        Ok(())
    }
}

impl AllocationStore for MemoryAllocationStore {
    fn commit_run(&self, commit: &RunCommit<'_>) -> RepositoryResult<Vec<i64>> {
        Self::check_batch(commit)?;

        let mut runs = self
            .runs
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let ids: Vec<i64> = commit
            .allocations
            .iter()
            .map(|_| self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
            .collect();

        let allocations = commit
            .allocations
            .iter()
            .zip(ids.iter())
            .map(|(a, id)| Allocation {
                allocation_id: Some(*id),
                ..a.clone()
            })
            .collect();

        runs.insert(
            commit.run.run_id.clone(),
            CommittedRun {
                run_id: commit.run.run_id.clone(),
                allocations,
                conflicts: commit.conflicts.to_vec(),
                completed_at: commit.completed_at,
            },
        );

        Ok(ids)
    }
}
