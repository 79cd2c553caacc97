// ==========================================
// 考场座位编排引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、容量接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod allocation;
pub mod hall;
pub mod run;
pub mod student;
pub mod types;

// 重导出核心类型
pub use allocation::{swap_seats, Allocation, Seat, SeatConflict};
pub use hall::{Hall, SeatCapacity};
pub use run::AllocationRun;
pub use student::{normalize_class_group, Student, UNASSIGNED_CLASS_GROUP};
pub use types::{AdjacencyStrictness, ConflictType, RunStatus, SeatNumbering};
