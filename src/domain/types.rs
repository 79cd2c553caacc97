// ==========================================
// 考场座位编排引擎 - 领域类型定义
// ==========================================
// 职责: 座位编号策略、相邻约束强度、冲突类型、运行状态
// 序列化格式: snake_case (与数据库/接口一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 座位编号策略 (Seat Numbering)
// ==========================================
// 仅影响座位号的展示口径，不影响座位的物理位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatNumbering {
    RowMajor,    // 按行编号
    ColumnMajor, // 按列编号
}

impl SeatNumbering {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatNumbering::RowMajor => "row_major",
            SeatNumbering::ColumnMajor => "column_major",
        }
    }

    /// 计算座位号（行列均从 1 开始）
    ///
    /// - row_major: `(row-1)*columns + column`
    /// - column_major: `(column-1)*rows + row`
    pub fn seat_number(&self, row: u32, column: u32, rows: u32, columns: u32) -> u32 {
        match self {
            SeatNumbering::RowMajor => (row - 1) * columns + column,
            SeatNumbering::ColumnMajor => (column - 1) * rows + row,
        }
    }
}

impl Default for SeatNumbering {
    fn default() -> Self {
        SeatNumbering::RowMajor
    }
}

impl fmt::Display for SeatNumbering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SeatNumbering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "row_major" | "row-major" => Ok(SeatNumbering::RowMajor),
            "column_major" | "column-major" => Ok(SeatNumbering::ColumnMajor),
            other => Err(format!("未知座位编号策略: {}", other)),
        }
    }
}

// ==========================================
// 相邻约束强度 (Adjacency Strictness)
// ==========================================
// hard: 触发冲突修复; soft: 只报告冲突
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjacencyStrictness {
    Hard,
    Soft,
}

impl AdjacencyStrictness {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjacencyStrictness::Hard => "hard",
            AdjacencyStrictness::Soft => "soft",
        }
    }
}

impl Default for AdjacencyStrictness {
    fn default() -> Self {
        AdjacencyStrictness::Hard
    }
}

impl fmt::Display for AdjacencyStrictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AdjacencyStrictness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hard" => Ok(AdjacencyStrictness::Hard),
            "soft" => Ok(AdjacencyStrictness::Soft),
            other => Err(format!("未知相邻约束强度: {}", other)),
        }
    }
}

// ==========================================
// 座位冲突类型 (Conflict Type)
// ==========================================
// 注意: SameClassDiagonal 仅为表结构保留，检测器不产生该类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    SameClassAdjacent,  // 左右相邻
    SameClassFrontBack, // 前后相邻
    SameClassDiagonal,  // 斜向相邻
}

impl ConflictType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictType::SameClassAdjacent => "same_class_adjacent",
            ConflictType::SameClassFrontBack => "same_class_front_back",
            ConflictType::SameClassDiagonal => "same_class_diagonal",
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConflictType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "same_class_adjacent" => Ok(ConflictType::SameClassAdjacent),
            "same_class_front_back" => Ok(ConflictType::SameClassFrontBack),
            "same_class_diagonal" => Ok(ConflictType::SameClassDiagonal),
            other => Err(format!("未知冲突类型: {}", other)),
        }
    }
}

// ==========================================
// 运行状态 (Run Status)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Pending,   // 已创建，未执行
    Completed, // 已完成并落库
    Failed,    // 执行失败（无任何分配记录）
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Pending => write!(f, "PENDING"),
            RunStatus::Completed => write!(f, "COMPLETED"),
            RunStatus::Failed => write!(f, "FAILED"),
        }
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(RunStatus::Pending),
            "COMPLETED" => Ok(RunStatus::Completed),
            "FAILED" => Ok(RunStatus::Failed),
            other => Err(format!("未知运行状态: {}", other)),
        }
    }
}
