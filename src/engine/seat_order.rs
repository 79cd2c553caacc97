// ==========================================
// 考场座位编排引擎 - 座位顺序生成
// ==========================================
// 行优先扫描全部 (row, column)，按棋盘格奇偶拆分:
// - primary:   (row + column) % 2 == 0
// - secondary: 其余座位
// 输出顺序 = primary ++ secondary，两段内部保持扫描顺序
// ==========================================

use crate::domain::allocation::Seat;
use crate::domain::hall::{Hall, SeatCapacity};
use crate::domain::types::SeatNumbering;

/// 单个考场的座位访问顺序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HallSeatOrder {
    pub hall_id: String,
    pub seats: Vec<Seat>,
    pub primary_count: usize,
}

impl HallSeatOrder {
    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
}

pub struct SeatOrderGenerator;

impl SeatOrderGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, hall: &Hall, numbering: SeatNumbering) -> HallSeatOrder {
        let mut primary = Vec::with_capacity(hall.capacity() / 2 + 1);
        let mut secondary = Vec::with_capacity(hall.capacity() / 2 + 1);

        for row in 1..=hall.rows {
            for column in 1..=hall.columns {
                let seat = Seat::in_hall(hall, row, column, numbering);
                if seat.is_primary() {
                    primary.push(seat);
                } else {
                    secondary.push(seat);
                }
            }
        }

        let primary_count = primary.len();
        primary.extend(secondary);

        HallSeatOrder {
            hall_id: hall.hall_id.clone(),
            seats: primary,
            primary_count,
        }
    }
}

impl Default for SeatOrderGenerator {
    fn default() -> Self {
        Self::new()
    }
}
