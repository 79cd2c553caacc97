// ==========================================
// 考场座位编排引擎 - 编排运行数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 状态迁移: PENDING → COMPLETED（由 AllocationRepository 在落库事务内完成）
//          PENDING / COMPLETED → FAILED（mark_failed，清除已落库结果）
// ==========================================

use crate::domain::run::AllocationRun;
use crate::domain::types::RunStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// 将文本列解析为枚举（解析失败映射为列转换错误）
pub(crate) fn parse_column<T>(row: &Row<'_>, idx: usize) -> SqliteResult<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

/// 编排运行仓储
/// 职责: 管理 allocation_run 表
pub struct RunRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RunRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<AllocationRun> {
        Ok(AllocationRun {
            run_id: row.get(0)?,
            exam_id: row.get(1)?,
            seed: row.get(2)?,
            seat_numbering: parse_column(row, 3)?,
            adjacency_strictness: parse_column(row, 4)?,
            status: parse_column(row, 5)?,
            config_snapshot_json: row.get(6)?,
            failure_reason: row.get(7)?,
            created_at: row.get(8)?,
            completed_at: row.get(9)?,
        })
    }

    /// 登记新运行（PENDING）
    pub fn create(&self, run: &AllocationRun) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO allocation_run (
                run_id, exam_id, seed, seat_numbering, adjacency_strictness,
                status, config_snapshot_json, failure_reason, created_at, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                run.run_id,
                run.exam_id,
                run.seed,
                run.seat_numbering.as_str(),
                run.adjacency_strictness.as_str(),
                run.status.to_string(),
                run.config_snapshot_json,
                run.failure_reason,
                run.created_at,
                run.completed_at,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, run_id: &str) -> RepositoryResult<Option<AllocationRun>> {
        let conn = self.get_conn()?;
        let run = conn
            .query_row(
                r#"
                SELECT run_id, exam_id, seed, seat_numbering, adjacency_strictness,
                       status, config_snapshot_json, failure_reason, created_at, completed_at
                FROM allocation_run
                WHERE run_id = ?1
                "#,
                params![run_id],
                Self::map_row,
            )
            .optional()?;
        Ok(run)
    }

    /// 标记运行失败
    ///
    /// 同一事务内清除该运行此前落库的冲突与分配记录，并将 completed_at 置空
    pub fn mark_failed(&self, run_id: &str, reason: &str) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let affected = tx.execute(
            "UPDATE allocation_run SET status = ?1, failure_reason = ?2, completed_at = NULL WHERE run_id = ?3",
            params![RunStatus::Failed.to_string(), reason, run_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "AllocationRun".to_string(),
                id: run_id.to_string(),
            });
        }

        tx.execute("DELETE FROM seat_conflict WHERE run_id = ?1", params![run_id])?;
        tx.execute("DELETE FROM seat_allocation WHERE run_id = ?1", params![run_id])?;
        tx.commit()?;
        Ok(())
    }

    /// 查询某场考试的全部运行（新 → 旧）
    pub fn list_by_exam(&self, exam_id: &str) -> RepositoryResult<Vec<AllocationRun>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT run_id, exam_id, seed, seat_numbering, adjacency_strictness,
                   status, config_snapshot_json, failure_reason, created_at, completed_at
            FROM allocation_run
            WHERE exam_id = ?1
            ORDER BY created_at DESC, run_id
            "#,
        )?;
        let runs = stmt
            .query_map(params![exam_id], Self::map_row)?
            .collect::<SqliteResult<Vec<AllocationRun>>>()?;
        Ok(runs)
    }
}
