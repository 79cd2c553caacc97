// ==========================================
// 考场座位编排引擎 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod allocation_repo;
pub mod error;
pub mod hall_repo;
pub mod run_repo;
pub mod student_repo;

// 重导出核心仓储
pub use allocation_repo::{AllocationRepository, SeatConflictEntity};
pub use error::{RepositoryError, RepositoryResult};
pub use hall_repo::HallRepository;
pub use run_repo::RunRepository;
pub use student_repo::StudentRepository;
