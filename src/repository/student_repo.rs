// ==========================================
// 考场座位编排引擎 - 考生与报名数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 名单顺序: exam_registration.seq_no（即导入顺序）
// ==========================================

use crate::domain::student::{normalize_class_group, Student};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

/// 考生仓储
/// 职责: 管理 student / exam_registration 表
pub struct StudentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudentRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 批量插入或更新考生（单事务）
    pub fn batch_upsert(&self, students: &[Student]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO student (student_id, full_name, class_group)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(student_id) DO UPDATE SET
                    full_name = excluded.full_name,
                    class_group = excluded.class_group
                "#,
            )?;
            for student in students {
                stmt.execute(params![student.student_id, student.full_name, student.class_group])?;
            }
        }
        tx.commit()?;
        Ok(students.len())
    }

    /// 登记考试名单（替换该考试已有名单，顺序即 seq_no）
    pub fn register_for_exam(&self, exam_id: &str, student_ids: &[String]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM exam_registration WHERE exam_id = ?1", params![exam_id])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO exam_registration (exam_id, student_id, seq_no) VALUES (?1, ?2, ?3)",
            )?;
            for (seq_no, student_id) in student_ids.iter().enumerate() {
                stmt.execute(params![exam_id, student_id, seq_no as i64])?;
            }
        }
        tx.commit()?;
        Ok(student_ids.len())
    }

    /// 按报名顺序查询考试名单
    pub fn list_roster(&self, exam_id: &str) -> RepositoryResult<Vec<Student>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT s.student_id, s.full_name, s.class_group
            FROM exam_registration r
            JOIN student s ON s.student_id = r.student_id
            WHERE r.exam_id = ?1
            ORDER BY r.seq_no
            "#,
        )?;
        let roster = stmt
            .query_map(params![exam_id], |row| {
                let class_group: Option<String> = row.get(2)?;
                Ok(Student {
                    student_id: row.get(0)?,
                    full_name: row.get(1)?,
                    class_group: normalize_class_group(class_group.as_deref()),
                })
            })?
            .collect::<SqliteResult<Vec<Student>>>()?;
        Ok(roster)
    }
}
