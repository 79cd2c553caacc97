// ==========================================
// 考场座位编排引擎 - 考场数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 考场顺序: sort_order → hall_id（作为引擎输入顺序的一部分）
// ==========================================

use crate::domain::hall::Hall;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// HallRepository - 考场仓储
// ==========================================

/// 考场仓储
/// 职责: 管理 exam_hall 表的 CRUD 操作
pub struct HallRepository {
    conn: Arc<Mutex<Connection>>,
}

impl HallRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<Hall> {
        Ok(Hall {
            hall_id: row.get(0)?,
            hall_name: row.get(1)?,
            rows: row.get(2)?,
            columns: row.get(3)?,
            active: row.get::<_, i64>(4)? != 0,
        })
    }

    /// 插入或更新单个考场
    ///
    /// # 参数
    /// - hall: 考场数据
    /// - sort_order: 排序号（越小越靠前）
    pub fn upsert(&self, hall: &Hall, sort_order: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO exam_hall (hall_id, hall_name, rows, columns, active, sort_order)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(hall_id) DO UPDATE SET
                hall_name = excluded.hall_name,
                rows = excluded.rows,
                columns = excluded.columns,
                active = excluded.active,
                sort_order = excluded.sort_order
            "#,
            params![
                hall.hall_id,
                hall.hall_name,
                hall.rows,
                hall.columns,
                hall.active as i64,
                sort_order,
            ],
        )?;
        Ok(())
    }

    /// 批量插入或更新考场（单事务，排序号为输入顺序）
    ///
    /// # 返回
    /// - Ok(usize): 写入条数
    pub fn batch_upsert(&self, halls: &[Hall]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO exam_hall (hall_id, hall_name, rows, columns, active, sort_order)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(hall_id) DO UPDATE SET
                    hall_name = excluded.hall_name,
                    rows = excluded.rows,
                    columns = excluded.columns,
                    active = excluded.active,
                    sort_order = excluded.sort_order
                "#,
            )?;
            for (idx, hall) in halls.iter().enumerate() {
                stmt.execute(params![
                    hall.hall_id,
                    hall.hall_name,
                    hall.rows,
                    hall.columns,
                    hall.active as i64,
                    idx as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(halls.len())
    }

    /// 按 hall_id 查询
    pub fn find_by_id(&self, hall_id: &str) -> RepositoryResult<Option<Hall>> {
        let conn = self.get_conn()?;
        let hall = conn
            .query_row(
                r#"
                SELECT hall_id, hall_name, rows, columns, active
                FROM exam_hall
                WHERE hall_id = ?1
                "#,
                params![hall_id],
                Self::map_row,
            )
            .optional()?;
        Ok(hall)
    }

    /// 查询全部考场（含停用）
    pub fn list_all(&self) -> RepositoryResult<Vec<Hall>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT hall_id, hall_name, rows, columns, active
            FROM exam_hall
            ORDER BY sort_order, hall_id
            "#,
        )?;
        let halls = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<Hall>>>()?;
        Ok(halls)
    }

    /// 查询启用考场
    pub fn list_active(&self) -> RepositoryResult<Vec<Hall>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT hall_id, hall_name, rows, columns, active
            FROM exam_hall
            WHERE active = 1
            ORDER BY sort_order, hall_id
            "#,
        )?;
        let halls = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<Hall>>>()?;
        Ok(halls)
    }

    /// 启用/停用考场
    pub fn set_active(&self, hall_id: &str, active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE exam_hall SET active = ?1 WHERE hall_id = ?2",
            params![active as i64, hall_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ExamHall".to_string(),
                id: hall_id.to_string(),
            });
        }
        Ok(())
    }
}
