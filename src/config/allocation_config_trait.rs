// ==========================================
// 考场座位编排引擎 - 编排配置读取 Trait
// ==========================================
// 职责: 定义编排所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::{AdjacencyStrictness, SeatNumbering};
use async_trait::async_trait;
use std::error::Error;

/// 配置读取结果
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// AllocationConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait AllocationConfigReader: Send + Sync {
    /// 未显式指定时的座位编号策略
    ///
    /// # 默认值
    /// - row_major
    async fn get_default_seat_numbering(&self) -> ConfigResult<SeatNumbering>;

    /// 未显式指定时的相邻约束强度
    ///
    /// # 默认值
    /// - hard
    async fn get_default_adjacency_strictness(&self) -> ConfigResult<AdjacencyStrictness>;

    /// 冲突修复尝试次数上限
    ///
    /// # 默认值
    /// - 1000（取值范围 1..=1000）
    async fn get_resolve_max_attempts(&self) -> ConfigResult<usize>;

    /// 未显式指定 seed 时生成 seed 的前缀
    ///
    /// # 默认值
    /// - "seat"
    async fn get_seed_prefix(&self) -> ConfigResult<String>;
}
