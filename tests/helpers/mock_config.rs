// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use exam_seating::config::{AllocationConfigReader, ConfigResult};
use exam_seating::domain::types::{AdjacencyStrictness, SeatNumbering};

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub seat_numbering: SeatNumbering,
    pub adjacency_strictness: AdjacencyStrictness,
    pub resolve_max_attempts: usize,
    pub seed_prefix: String,
}

impl MockConfig {
    /// 创建默认配置
    pub fn default() -> Self {
        Self {
            seat_numbering: SeatNumbering::RowMajor,
            adjacency_strictness: AdjacencyStrictness::Hard,
            resolve_max_attempts: 1000,
            seed_prefix: "seat".to_string(),
        }
    }

    pub fn with_max_attempts(max_attempts: usize) -> Self {
        let mut config = Self::default();
        config.resolve_max_attempts = max_attempts;
        config
    }
}

#[async_trait]
impl AllocationConfigReader for MockConfig {
    async fn get_default_seat_numbering(&self) -> ConfigResult<SeatNumbering> {
        Ok(self.seat_numbering)
    }

    async fn get_default_adjacency_strictness(&self) -> ConfigResult<AdjacencyStrictness> {
        Ok(self.adjacency_strictness)
    }

    async fn get_resolve_max_attempts(&self) -> ConfigResult<usize> {
        Ok(self.resolve_max_attempts)
    }

    async fn get_seed_prefix(&self) -> ConfigResult<String> {
        Ok(self.seed_prefix.clone())
    }
}
