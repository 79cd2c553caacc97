// ==========================================
// 考场座位编排引擎 - 引擎层
// ==========================================
// 职责: 实现分配规则与运行编排,不拼 SQL
// 红线: Engine 不拼 SQL; 落库经由 AllocationStore 接口
// ==========================================

pub mod capacity_validator;
pub mod class_grouper;
pub mod conflict_detector;
pub mod conflict_resolver;
pub mod error;
pub mod metadata;
pub mod orchestrator;
pub mod round_robin;
pub mod seat_order;
pub mod shuffler;
pub mod store;

// 重导出核心引擎
pub use capacity_validator::{CapacityReport, CapacityValidator};
pub use class_grouper::{ClassGroup, ClassGrouper, ClassGroups};
pub use conflict_detector::ConflictDetector;
pub use conflict_resolver::{ConflictResolver, ResolveReport, MAX_RESOLVE_ATTEMPTS};
pub use error::{EngineError, EngineResult, EngineStage, RunError};
pub use metadata::{MetadataAggregator, RunMetadata};
pub use orchestrator::{
    AllocationEngine, AllocationPlan, EngineConfig, RunOutcome, RunSummary, RunWarning,
};
pub use round_robin::RoundRobinAllocator;
pub use seat_order::{HallSeatOrder, SeatOrderGenerator};
pub use shuffler::SeededShuffler;
pub use store::{AllocationStore, CommittedRun, MemoryAllocationStore, RunCommit};
