// ==========================================
// 考场座位编排引擎 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 考试管理系统的座位编排子系统
// 红线: 同一 seed + 同一输入 => 同一分配结果
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 分配规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AdjacencyStrictness, ConflictType, RunStatus, SeatNumbering};

// 领域实体
pub use domain::{Allocation, AllocationRun, Hall, Seat, SeatConflict, Student};

// 引擎
pub use engine::{
    AllocationEngine, AllocationStore, EngineConfig, EngineError, EngineStage,
    MemoryAllocationStore, RunError, RunOutcome, RunWarning,
};

// API
pub use api::{AllocationApi, ApiError, CreateRunRequest, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "考场座位编排引擎";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
