// ==========================================
// 考场座位编排引擎 - 座位分配领域模型
// ==========================================
// 不变量:
// - 同一运行内 (hall_id, row, column) 唯一（一座一人）
// - 同一运行内 student_id 唯一（一人一座）
// 冲突记录通过 arena 下标引用分配记录，落库后再映射为持久化 ID
// ==========================================

use crate::domain::hall::Hall;
use crate::domain::types::{ConflictType, SeatNumbering};
use serde::{Deserialize, Serialize};

// ==========================================
// Seat - 座位坐标
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seat {
    pub row: u32,
    pub column: u32,
    pub seat_number: u32,
}

impl Seat {
    /// 按编号策略构造座位
    pub fn in_hall(hall: &Hall, row: u32, column: u32, numbering: SeatNumbering) -> Self {
        Self {
            row,
            column,
            seat_number: numbering.seat_number(row, column, hall.rows, hall.columns),
        }
    }

    /// 棋盘格主座位: (row + column) 为偶数
    pub fn is_primary(&self) -> bool {
        (self.row + self.column) % 2 == 0
    }
}

// ==========================================
// Allocation - 座位分配记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub allocation_id: Option<i64>, // 落库后回填
    pub run_id: String,
    pub hall_id: String,
    pub student_id: String,
    pub row: u32,
    pub column: u32,
    pub seat_number: u32,
    pub class_group: Option<String>,
}

impl Allocation {
    pub fn seat(&self) -> Seat {
        Seat {
            row: self.row,
            column: self.column,
            seat_number: self.seat_number,
        }
    }

    fn place(&mut self, seat: Seat) {
        self.row = seat.row;
        self.column = seat.column;
        self.seat_number = seat.seat_number;
    }
}

/// 原地交换两条分配记录的 (row, column, seat_number)
///
/// 调用方保证二者位于同一考场
pub fn swap_seats(allocations: &mut [Allocation], a: usize, b: usize) {
    if a == b {
        return;
    }
    let seat_a = allocations[a].seat();
    let seat_b = allocations[b].seat();
    allocations[a].place(seat_b);
    allocations[b].place(seat_a);
}

// ==========================================
// SeatConflict - 座位冲突记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatConflict {
    pub allocation_ref: usize,             // arena 下标
    pub conflicting_allocation_ref: usize, // arena 下标
    pub conflict_type: ConflictType,
    pub resolved: bool,
}

impl SeatConflict {
    pub fn new(allocation_ref: usize, conflicting_allocation_ref: usize, conflict_type: ConflictType) -> Self {
        Self {
            allocation_ref,
            conflicting_allocation_ref,
            conflict_type,
            resolved: false,
        }
    }

    /// 无序对比较: (a,b) 与 (b,a) 视为同一冲突
    pub fn same_pair(&self, other: &SeatConflict) -> bool {
        self.conflict_type == other.conflict_type
            && self.pair_key() == other.pair_key()
    }

    pub fn pair_key(&self) -> (usize, usize) {
        let a = self.allocation_ref;
        let b = self.conflicting_allocation_ref;
        (a.min(b), a.max(b))
    }

    pub fn mark_resolved(mut self) -> Self {
        self.resolved = true;
        self
    }
}
