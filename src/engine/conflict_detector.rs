// ==========================================
// 考场座位编排引擎 - 座位冲突检测
// ==========================================
// 规则: 同一考场内，同班考生左右/前后相邻即为冲突
// - 左右 (同行, 列±1) → same_class_adjacent
// - 前后 (同列, 行±1) → same_class_front_back
// - 斜向相邻不检测（same_class_diagonal 从不产生）
// - 跨考场永不冲突；无班级考生不参与检测
// 扫描顺序: 考场首次出现顺序 → 行升序 → 列升序 → 左/右/前/后
// 位置索引每次检测从头重建，不做增量维护
// ==========================================

use crate::domain::allocation::{Allocation, SeatConflict};
use crate::domain::types::ConflictType;
use std::collections::{HashMap, HashSet};

/// 相邻方向（固定检测顺序）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Left,
    Right,
    Front,
    Back,
}

impl Direction {
    const ORTHOGONAL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Front,
        Direction::Back,
    ];

    fn neighbor(&self, row: u32, column: u32) -> Option<(u32, u32)> {
        match self {
            Direction::Left => column.checked_sub(1).map(|c| (row, c)),
            Direction::Right => Some((row, column + 1)),
            Direction::Front => row.checked_sub(1).map(|r| (r, column)),
            Direction::Back => Some((row + 1, column)),
        }
    }

    fn conflict_type(&self) -> ConflictType {
        match self {
            Direction::Left | Direction::Right => ConflictType::SameClassAdjacent,
            Direction::Front | Direction::Back => ConflictType::SameClassFrontBack,
        }
    }
}

pub struct ConflictDetector;

impl ConflictDetector {
    pub fn new() -> Self {
        Self
    }

    /// 全量检测（纯函数）
    ///
    /// 同一对考生只报告一次: 先扫描到的一方作为 allocation_ref
    pub fn detect(&self, allocations: &[Allocation]) -> Vec<SeatConflict> {
        // 按考场分组（保持首次出现顺序）
        let mut hall_order: Vec<&str> = Vec::new();
        let mut by_hall: HashMap<&str, Vec<usize>> = HashMap::new();
        for (idx, allocation) in allocations.iter().enumerate() {
            by_hall
                .entry(allocation.hall_id.as_str())
                .or_insert_with(|| {
                    hall_order.push(allocation.hall_id.as_str());
                    Vec::new()
                })
                .push(idx);
        }

        let mut conflicts = Vec::new();
        let mut reported: HashSet<(usize, usize)> = HashSet::new();

        for hall_id in hall_order {
            let Some(members) = by_hall.get_mut(hall_id) else {
                continue;
            };
            members.sort_by_key(|&i| (allocations[i].row, allocations[i].column));

            // 位置索引 (row, column) → arena 下标
            let position: HashMap<(u32, u32), usize> = members
                .iter()
                .map(|&i| ((allocations[i].row, allocations[i].column), i))
                .collect();

            for &idx in members.iter() {
                let current = &allocations[idx];
                let Some(group) = current.class_group.as_deref() else {
                    continue;
                };

                for direction in Direction::ORTHOGONAL {
                    let Some(coord) = direction.neighbor(current.row, current.column) else {
                        continue;
                    };
                    let Some(&other) = position.get(&coord) else {
                        continue;
                    };
                    if allocations[other].class_group.as_deref() != Some(group) {
                        continue;
                    }
                    if reported.insert((idx.min(other), idx.max(other))) {
                        conflicts.push(SeatConflict::new(idx, other, direction.conflict_type()));
                    }
                }
            }
        }

        conflicts
    }
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new()
    }
}
