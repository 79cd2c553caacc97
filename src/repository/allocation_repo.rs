// ==========================================
// 考场座位编排引擎 - 座位分配结果仓储
// ==========================================
// 红线: 一次运行的分配 + 冲突 + 运行状态在同一事务内提交
// - 任一行写入失败 → 整体回滚，不残留部分结果
// - 同一 run_id 重复提交 → 替换旧结果
// ==========================================

use crate::domain::allocation::Allocation;
use crate::domain::types::{ConflictType, RunStatus};
use crate::engine::store::{AllocationStore, RunCommit};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::run_repo::parse_column;
use rusqlite::{params, Connection, Result as SqliteResult};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

/// 已落库的冲突记录（引用持久化分配 ID）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatConflictEntity {
    pub conflict_id: i64,
    pub run_id: String,
    pub allocation_id: i64,
    pub conflicting_allocation_id: i64,
    pub conflict_type: ConflictType,
    pub resolved: bool,
}

/// 座位分配仓储
/// 职责: 管理 seat_allocation / seat_conflict 表，并在提交时更新 allocation_run
pub struct AllocationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AllocationRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询某次运行的全部分配（按 allocation_id，即生成顺序）
    pub fn list_allocations(&self, run_id: &str) -> RepositoryResult<Vec<Allocation>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT allocation_id, run_id, hall_id, student_id, row_no, col_no, seat_number, class_group
            FROM seat_allocation
            WHERE run_id = ?1
            ORDER BY allocation_id
            "#,
        )?;
        let allocations = stmt
            .query_map(params![run_id], |row| {
                Ok(Allocation {
                    allocation_id: Some(row.get(0)?),
                    run_id: row.get(1)?,
                    hall_id: row.get(2)?,
                    student_id: row.get(3)?,
                    row: row.get(4)?,
                    column: row.get(5)?,
                    seat_number: row.get(6)?,
                    class_group: row.get(7)?,
                })
            })?
            .collect::<SqliteResult<Vec<Allocation>>>()?;
        Ok(allocations)
    }

    /// 查询某次运行的全部冲突
    pub fn list_conflicts(&self, run_id: &str) -> RepositoryResult<Vec<SeatConflictEntity>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT conflict_id, run_id, allocation_id, conflicting_allocation_id, conflict_type, resolved
            FROM seat_conflict
            WHERE run_id = ?1
            ORDER BY conflict_id
            "#,
        )?;
        let conflicts = stmt
            .query_map(params![run_id], |row| {
                Ok(SeatConflictEntity {
                    conflict_id: row.get(0)?,
                    run_id: row.get(1)?,
                    allocation_id: row.get(2)?,
                    conflicting_allocation_id: row.get(3)?,
                    conflict_type: parse_column(row, 4)?,
                    resolved: row.get::<_, i64>(5)? != 0,
                })
            })?
            .collect::<SqliteResult<Vec<SeatConflictEntity>>>()?;
        Ok(conflicts)
    }
}

impl AllocationStore for AllocationRepository {
    #[instrument(skip(self, commit), fields(
        run_id = %commit.run.run_id,
        allocations_count = commit.allocations.len(),
        conflicts_count = commit.conflicts.len()
    ))]
    fn commit_run(&self, commit: &RunCommit<'_>) -> RepositoryResult<Vec<i64>> {
        let run = commit.run;
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        // 运行行: 不存在则补登，存在则置为完成
        tx.execute(
            r#"
            INSERT INTO allocation_run (
                run_id, exam_id, seed, seat_numbering, adjacency_strictness,
                status, config_snapshot_json, failure_reason, created_at, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8, ?9)
            ON CONFLICT(run_id) DO UPDATE SET
                status = excluded.status,
                failure_reason = NULL,
                completed_at = excluded.completed_at
            "#,
            params![
                run.run_id,
                run.exam_id,
                run.seed,
                run.seat_numbering.as_str(),
                run.adjacency_strictness.as_str(),
                RunStatus::Completed.to_string(),
                run.config_snapshot_json,
                run.created_at,
                commit.completed_at,
            ],
        )?;

        // 同一运行的旧结果整体替换
        tx.execute("DELETE FROM seat_conflict WHERE run_id = ?1", params![run.run_id])?;
        tx.execute("DELETE FROM seat_allocation WHERE run_id = ?1", params![run.run_id])?;

        let mut ids = Vec::with_capacity(commit.allocations.len());
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO seat_allocation (
                    run_id, hall_id, student_id, row_no, col_no, seat_number, class_group
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )?;
            for a in commit.allocations {
                let id = stmt.insert(params![
                    run.run_id,
                    a.hall_id,
                    a.student_id,
                    a.row,
                    a.column,
                    a.seat_number,
                    a.class_group,
                ])?;
                ids.push(id);
            }
        }

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO seat_conflict (
                    run_id, allocation_id, conflicting_allocation_id, conflict_type, resolved
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;
            for c in commit.conflicts {
                let (Some(&a), Some(&b)) = (
                    ids.get(c.allocation_ref),
                    ids.get(c.conflicting_allocation_ref),
                ) else {
                    // tx 未提交，drop 时自动回滚
                    return Err(RepositoryError::ForeignKeyViolation(format!(
                        "冲突引用越界: ({}, {})",
                        c.allocation_ref, c.conflicting_allocation_ref
                    )));
                };
                stmt.execute(params![
                    run.run_id,
                    a,
                    b,
                    c.conflict_type.as_str(),
                    c.resolved as i64,
                ])?;
            }
        }

        tx.commit()?;
        debug!(persisted = ids.len(), "运行结果已落库");
        Ok(ids)
    }
}
