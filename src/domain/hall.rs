// ==========================================
// 考场座位编排引擎 - 考场领域模型
// ==========================================
// 红线: 考场容量约束优先于一切分配规则
// 用途: 座位容量计算，座位坐标校验
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Hall - 考场
// ==========================================
// 一次运行期间不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hall {
    pub hall_id: String,           // 考场ID
    pub hall_name: Option<String>, // 考场名称

    // ===== 座位布局 =====
    pub rows: u32,    // 行数 (>0)
    pub columns: u32, // 列数 (>0)

    pub active: bool, // 是否启用
}

impl Hall {
    /// 创建启用状态的考场
    pub fn new(hall_id: impl Into<String>, rows: u32, columns: u32) -> Self {
        Self {
            hall_id: hall_id.into(),
            hall_name: None,
            rows,
            columns,
            active: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.hall_name = Some(name.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

// ==========================================
// Trait: SeatCapacity
// ==========================================
// 用途: CapacityValidator / RoundRobinAllocator 容量检查接口
pub trait SeatCapacity {
    /// 座位容量 = rows * columns
    fn capacity(&self) -> usize;

    /// 行列是否均为正数
    fn has_valid_shape(&self) -> bool;

    /// 坐标 (row, column) 是否落在考场内（从 1 开始）
    fn contains(&self, row: u32, column: u32) -> bool;
}

impl SeatCapacity for Hall {
    fn capacity(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    fn has_valid_shape(&self) -> bool {
        self.rows > 0 && self.columns > 0
    }

    fn contains(&self, row: u32, column: u32) -> bool {
        row >= 1 && row <= self.rows && column >= 1 && column <= self.columns
    }
}
