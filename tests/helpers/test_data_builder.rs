// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use exam_seating::domain::types::{AdjacencyStrictness, SeatNumbering};
use exam_seating::domain::{AllocationRun, Hall, Student};

// ==========================================
// 考生名单构建器
// ==========================================
// 按班级追加考生，学号按追加顺序编号
pub struct RosterBuilder {
    students: Vec<Student>,
}

impl RosterBuilder {
    pub fn new() -> Self {
        Self {
            students: Vec::new(),
        }
    }

    /// 追加 count 名同班考生
    pub fn class(mut self, class_group: &str, count: usize) -> Self {
        for _ in 0..count {
            let id = format!("S{:04}", self.students.len() + 1);
            self.students.push(Student::new(id, Some(class_group)));
        }
        self
    }

    /// 追加 count 名无班级考生
    pub fn unassigned(mut self, count: usize) -> Self {
        for _ in 0..count {
            let id = format!("S{:04}", self.students.len() + 1);
            self.students.push(Student::new(id, None));
        }
        self
    }

    /// 班级交替出现（A,B,C,A,B,C,...）
    pub fn interleaved(mut self, classes: &[&str], total: usize) -> Self {
        for i in 0..total {
            let id = format!("S{:04}", self.students.len() + 1);
            self.students.push(Student::new(id, Some(classes[i % classes.len()])));
        }
        self
    }

    pub fn build(self) -> Vec<Student> {
        self.students
    }
}

// ==========================================
// 考场 / 运行快捷构造
// ==========================================

/// n 个同尺寸考场: H1..Hn
pub fn uniform_halls(count: usize, rows: u32, columns: u32) -> Vec<Hall> {
    (1..=count)
        .map(|i| Hall::new(format!("H{}", i), rows, columns))
        .collect()
}

pub fn run(seed: &str, numbering: SeatNumbering, strictness: AdjacencyStrictness) -> AllocationRun {
    AllocationRun::new("EXAM-1", seed, numbering, strictness)
}

pub fn hard_run(seed: &str) -> AllocationRun {
    run(seed, SeatNumbering::RowMajor, AdjacencyStrictness::Hard)
}

pub fn soft_run(seed: &str) -> AllocationRun {
    run(seed, SeatNumbering::RowMajor, AdjacencyStrictness::Soft)
}
