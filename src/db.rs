// ==========================================
// 考场座位编排引擎 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 提供建表脚本，新库首次打开即可用
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前建表脚本对应的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 建表脚本（幂等）
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL DEFAULT 'global',
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS exam_hall (
    hall_id TEXT PRIMARY KEY,
    hall_name TEXT,
    rows INTEGER NOT NULL CHECK (rows > 0),
    columns INTEGER NOT NULL CHECK (columns > 0),
    active INTEGER NOT NULL DEFAULT 1,
    sort_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS student (
    student_id TEXT PRIMARY KEY,
    full_name TEXT,
    class_group TEXT
);

CREATE TABLE IF NOT EXISTS exam_registration (
    exam_id TEXT NOT NULL,
    student_id TEXT NOT NULL REFERENCES student(student_id),
    seq_no INTEGER NOT NULL,
    PRIMARY KEY (exam_id, student_id)
);

CREATE TABLE IF NOT EXISTS allocation_run (
    run_id TEXT PRIMARY KEY,
    exam_id TEXT NOT NULL,
    seed TEXT NOT NULL,
    seat_numbering TEXT NOT NULL,
    adjacency_strictness TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'PENDING',
    config_snapshot_json TEXT,
    failure_reason TEXT,
    created_at TEXT NOT NULL,
    completed_at TEXT
);

CREATE TABLE IF NOT EXISTS seat_allocation (
    allocation_id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id TEXT NOT NULL REFERENCES allocation_run(run_id),
    hall_id TEXT NOT NULL,
    student_id TEXT NOT NULL,
    row_no INTEGER NOT NULL,
    col_no INTEGER NOT NULL,
    seat_number INTEGER NOT NULL,
    class_group TEXT,
    UNIQUE (run_id, hall_id, row_no, col_no),
    UNIQUE (run_id, student_id)
);

CREATE TABLE IF NOT EXISTS seat_conflict (
    conflict_id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id TEXT NOT NULL REFERENCES allocation_run(run_id),
    allocation_id INTEGER NOT NULL REFERENCES seat_allocation(allocation_id),
    conflicting_allocation_id INTEGER NOT NULL REFERENCES seat_allocation(allocation_id),
    conflict_type TEXT NOT NULL,
    resolved INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_seat_allocation_run ON seat_allocation(run_id);
CREATE INDEX IF NOT EXISTS idx_seat_conflict_run ON seat_conflict(run_id);
CREATE INDEX IF NOT EXISTS idx_allocation_run_exam ON allocation_run(exam_id);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表并登记 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
