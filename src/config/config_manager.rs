// ==========================================
// 考场座位编排引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 非法配置值回退到默认值并记录告警，不中断运行
// ==========================================

use crate::config::allocation_config_trait::{AllocationConfigReader, ConfigResult};
use crate::db::open_sqlite_connection;
use crate::domain::types::{AdjacencyStrictness, SeatNumbering};
use crate::engine::conflict_resolver::MAX_RESOLVE_ATTEMPTS;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取并解析配置值；缺失或非法时返回默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr,
    {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };
        match raw.parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                tracing::warn!(config_key = key, raw_value = %raw, "配置值非法，使用默认值");
                Ok(default)
            }
        }
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 在创建运行时记录配置快照，便于复现
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }
}

// ==========================================
// AllocationConfigReader Trait 实现
// ==========================================
#[async_trait]
impl AllocationConfigReader for ConfigManager {
    async fn get_default_seat_numbering(&self) -> ConfigResult<SeatNumbering> {
        self.get_parsed_or_default(config_keys::SEAT_NUMBERING_DEFAULT, SeatNumbering::RowMajor)
    }

    async fn get_default_adjacency_strictness(&self) -> ConfigResult<AdjacencyStrictness> {
        self.get_parsed_or_default(
            config_keys::ADJACENCY_STRICTNESS_DEFAULT,
            AdjacencyStrictness::Hard,
        )
    }

    async fn get_resolve_max_attempts(&self) -> ConfigResult<usize> {
        let value = self.get_parsed_or_default(config_keys::RESOLVE_MAX_ATTEMPTS, MAX_RESOLVE_ATTEMPTS)?;
        Ok(value.clamp(1, MAX_RESOLVE_ATTEMPTS))
    }

    async fn get_seed_prefix(&self) -> ConfigResult<String> {
        let value = self
            .get_config_value(config_keys::SEED_PREFIX)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        Ok(value.unwrap_or_else(|| "seat".to_string()))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const SEAT_NUMBERING_DEFAULT: &str = "seat_numbering_default";
    pub const ADJACENCY_STRICTNESS_DEFAULT: &str = "adjacency_strictness_default";
    pub const RESOLVE_MAX_ATTEMPTS: &str = "resolve_max_attempts";
    pub const SEED_PREFIX: &str = "seed_prefix";
}
