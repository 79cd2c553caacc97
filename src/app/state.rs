// ==========================================
// 考场座位编排引擎 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 所有仓储共享同一连接（Arc<Mutex<Connection>>）
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::{AllocationApi, ImportApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::{AllocationRepository, HallRepository, RunRepository, StudentRepository};

/// DB 路径环境变量
pub const DB_PATH_ENV: &str = "EXAM_SEATING_DB_PATH";

/// 应用状态
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 编排API
    pub allocation_api: Arc<AllocationApi>,

    /// 导入API
    pub import_api: Arc<ImportApi>,

    /// 配置管理器
    pub config: Arc<ConfigManager>,

    /// 考场仓储（用于启停考场）
    pub hall_repo: Arc<HallRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并建表（幂等）
    /// 2. 初始化所有Repository
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "初始化AppState");

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        Self::from_connection(db_path, conn)
    }

    /// 从已有连接创建（连接需已建表）
    pub fn from_connection(db_path: String, conn: Arc<Mutex<Connection>>) -> Result<Self, String> {
        // ==========================================
        // 初始化Repository层
        // ==========================================
        let hall_repo = Arc::new(HallRepository::from_connection(conn.clone()));
        let student_repo = Arc::new(StudentRepository::from_connection(conn.clone()));
        let run_repo = Arc::new(RunRepository::from_connection(conn.clone()));
        let allocation_repo = Arc::new(AllocationRepository::from_connection(conn.clone()));

        let config = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let allocation_api = Arc::new(AllocationApi::new(
            run_repo,
            hall_repo.clone(),
            student_repo.clone(),
            allocation_repo,
            config.clone(),
        ));
        let import_api = Arc::new(ImportApi::new(hall_repo.clone(), student_repo));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            allocation_api,
            import_api,
            config,
            hall_repo,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 EXAM_SEATING_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./exam_seating.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("exam-seating");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("exam_seating.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_app_state_on_temp_db() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("seating.db").to_string_lossy().to_string();
        let state = AppState::new(db_path.clone()).unwrap();
        assert_eq!(state.db_path, db_path);
        assert!(state.hall_repo.list_all().unwrap().is_empty());
    }
}
