// ==========================================
// 考场座位编排引擎 - 轮转分配引擎
// ==========================================
// 红线: 考场容量约束优先于班级均衡
// ==========================================
// 职责: 按轮次为每个班级各取一名考生，依次落座
// 输入: 洗牌后的班级分组 + 考场列表（按容量降序） + 座位顺序
// 输出: 分配记录 arena
// ==========================================

use crate::domain::allocation::{Allocation, Seat};
use crate::domain::hall::{Hall, SeatCapacity};
use crate::domain::student::normalize_class_group;
use crate::domain::types::SeatNumbering;
use crate::engine::class_grouper::ClassGroups;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::seat_order::{HallSeatOrder, SeatOrderGenerator};
use tracing::{debug, instrument};

// ==========================================
// SeatCursor - 跨考场座位游标
// ==========================================
struct SeatCursor {
    orders: Vec<HallSeatOrder>,
    hall_index: usize,
    seat_index: usize,
}

impl SeatCursor {
    fn new(orders: Vec<HallSeatOrder>) -> Self {
        Self {
            orders,
            hall_index: 0,
            seat_index: 0,
        }
    }

    /// 取下一个座位；当前考场用尽时切换到下一考场并重置游标
    fn next_seat(&mut self) -> Option<(&str, Seat)> {
        while self.hall_index < self.orders.len() {
            if self.seat_index < self.orders[self.hall_index].len() {
                let order = &self.orders[self.hall_index];
                let seat = order.seats[self.seat_index];
                self.seat_index += 1;
                return Some((order.hall_id.as_str(), seat));
            }
            self.hall_index += 1;
            self.seat_index = 0;
        }
        None
    }
}

// ==========================================
// RoundRobinAllocator - 轮转分配引擎
// ==========================================
pub struct RoundRobinAllocator {
    seat_order: SeatOrderGenerator,
}

impl RoundRobinAllocator {
    pub fn new() -> Self {
        Self {
            seat_order: SeatOrderGenerator::new(),
        }
    }

    /// 考场按容量降序（稳定排序，容量相同保持输入顺序）
    pub fn order_halls<'a>(&self, halls: &'a [Hall]) -> Vec<&'a Hall> {
        let mut ordered: Vec<&Hall> = halls.iter().collect();
        ordered.sort_by(|a, b| b.capacity().cmp(&a.capacity()));
        ordered
    }

    /// 执行轮转分配
    ///
    /// 规则:
    /// 1) 每一轮按分组首次出现顺序访问各班级
    /// 2) 班级仍有考生时取下一名考生 + 下一座位
    /// 3) 一轮未分配任何考生即结束
    ///
    /// # 返回
    /// - Ok(分配记录): 记录数 == 考生总数
    /// - Err(SeatsExhausted): 需要座位但已无考场（容量校验与分配不一致）
    #[instrument(skip(self, halls, groups), fields(
        run_id = %run_id,
        halls_count = halls.len(),
        groups_count = groups.len(),
        roster_size = groups.total_students()
    ))]
    pub fn allocate(
        &self,
        run_id: &str,
        halls: &[Hall],
        groups: &ClassGroups,
        numbering: SeatNumbering,
    ) -> EngineResult<Vec<Allocation>> {
        let roster_size = groups.total_students();
        let orders: Vec<HallSeatOrder> = self
            .order_halls(halls)
            .into_iter()
            .map(|hall| self.seat_order.generate(hall, numbering))
            .collect();
        let mut cursor = SeatCursor::new(orders);

        let mut allocations: Vec<Allocation> = Vec::with_capacity(roster_size);
        let mut group_cursors = vec![0usize; groups.len()];
        let mut round = 0usize;

        loop {
            let mut placed = 0usize;

            for (gi, group) in groups.iter().enumerate() {
                let Some(student) = group.students.get(group_cursors[gi]) else {
                    continue;
                };

                let (hall_id, seat) = cursor.next_seat().ok_or(EngineError::SeatsExhausted {
                    placed: allocations.len(),
                    roster_size,
                })?;

                allocations.push(Allocation {
                    allocation_id: None,
                    run_id: run_id.to_string(),
                    hall_id: hall_id.to_string(),
                    student_id: student.student_id.clone(),
                    row: seat.row,
                    column: seat.column,
                    seat_number: seat.seat_number,
                    class_group: normalize_class_group(student.class_group.as_deref()),
                });
                group_cursors[gi] += 1;
                placed += 1;
            }

            if placed == 0 {
                break;
            }
            round += 1;
        }

        debug!(rounds = round, placed = allocations.len(), "轮转分配完成");
        Ok(allocations)
    }
}

impl Default for RoundRobinAllocator {
    fn default() -> Self {
        Self::new()
    }
}
