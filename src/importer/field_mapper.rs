// ==========================================
// 考场座位编排引擎 - 字段映射器
// ==========================================
// 职责: 源列名（中英文别名）→ 标准字段 + 类型转换
// ==========================================

use crate::domain::hall::Hall;
use crate::domain::student::{normalize_class_group, Student};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRecord;

/// 标准字段及其可接受列名
const STUDENT_ID: &[&str] = &["student_id", "学号", "考号"];
const FULL_NAME: &[&str] = &["full_name", "name", "姓名"];
const CLASS_GROUP: &[&str] = &["class_group", "class", "班级", "年级"];
const HALL_ID: &[&str] = &["hall_id", "考场", "考场编号"];
const HALL_NAME: &[&str] = &["hall_name", "考场名称"];
const ROWS: &[&str] = &["rows", "行数"];
const COLUMNS: &[&str] = &["columns", "cols", "列数"];
const ACTIVE: &[&str] = &["active", "启用"];

pub struct FieldMapper;

impl FieldMapper {
    pub fn new() -> Self {
        Self
    }

    /// 提取字符串字段（按别名顺序取第一个非空值）
    fn get_string(&self, row: &RawRecord, aliases: &[&str]) -> Option<String> {
        aliases
            .iter()
            .filter_map(|alias| row.get(*alias))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn require(&self, row: &RawRecord, aliases: &[&str], row_number: usize) -> ImportResult<String> {
        self.get_string(row, aliases)
            .ok_or_else(|| ImportError::PrimaryKeyMissing {
                row: row_number,
                field: aliases[0].to_string(),
            })
    }

    /// 正整数字段（Excel 数字单元格可能带 ".0"）
    fn parse_positive(&self, row: &RawRecord, aliases: &[&str], row_number: usize) -> ImportResult<u32> {
        let raw = self.get_string(row, aliases).ok_or_else(|| ImportError::TypeConversionError {
            row: row_number,
            field: aliases[0].to_string(),
            message: "值为空".to_string(),
        })?;
        let value = raw
            .strip_suffix(".0")
            .unwrap_or(raw.as_str())
            .parse::<u32>()
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| ImportError::TypeConversionError {
                row: row_number,
                field: aliases[0].to_string(),
                message: format!("期望正整数，实际 {}", raw),
            })?;
        Ok(value)
    }

    fn parse_flag(&self, row: &RawRecord, aliases: &[&str], row_number: usize) -> ImportResult<bool> {
        let Some(raw) = self.get_string(row, aliases) else {
            return Ok(true);
        };
        match raw.to_lowercase().as_str() {
            "1" | "true" | "y" | "yes" | "是" => Ok(true),
            "0" | "false" | "n" | "no" | "否" => Ok(false),
            _ => Err(ImportError::TypeConversionError {
                row: row_number,
                field: aliases[0].to_string(),
                message: format!("无法识别的启用标记: {}", raw),
            }),
        }
    }

    /// 判断表头是否包含字段（任一别名）
    pub fn has_column(&self, row: &RawRecord, aliases: &[&str]) -> bool {
        aliases.iter().any(|a| row.contains_key(*a))
    }

    pub fn map_student(&self, row: &RawRecord, row_number: usize) -> ImportResult<Student> {
        let student_id = self.require(row, STUDENT_ID, row_number)?;
        let class_group = self.get_string(row, CLASS_GROUP);
        Ok(Student {
            student_id,
            full_name: self.get_string(row, FULL_NAME),
            class_group: normalize_class_group(class_group.as_deref()),
        })
    }

    pub fn map_hall(&self, row: &RawRecord, row_number: usize) -> ImportResult<Hall> {
        Ok(Hall {
            hall_id: self.require(row, HALL_ID, row_number)?,
            hall_name: self.get_string(row, HALL_NAME),
            rows: self.parse_positive(row, ROWS, row_number)?,
            columns: self.parse_positive(row, COLUMNS, row_number)?,
            active: self.parse_flag(row, ACTIVE, row_number)?,
        })
    }

    /// 名单文件必需列
    pub fn check_roster_columns(&self, first: &RawRecord) -> ImportResult<()> {
        if !self.has_column(first, STUDENT_ID) {
            return Err(ImportError::MissingColumn(STUDENT_ID[0].to_string()));
        }
        Ok(())
    }

    /// 考场文件必需列
    pub fn check_hall_columns(&self, first: &RawRecord) -> ImportResult<()> {
        for aliases in [HALL_ID, ROWS, COLUMNS] {
            if !self.has_column(first, aliases) {
                return Err(ImportError::MissingColumn(aliases[0].to_string()));
            }
        }
        Ok(())
    }
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new()
    }
}
