// ==========================================
// 考场座位编排引擎 - 名单/考场导入器
// ==========================================
// 流程: 文件解析 → 必需列检查 → 逐行映射 → 去重 → 单事务落库
// 行级问题（主键缺失/类型错误/重复）跳过并记录，不中断整个文件
// 文件级问题（无法解析/缺少必需列）直接返回错误
// ==========================================

use crate::domain::hall::Hall;
use crate::domain::student::Student;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{RawRecord, UniversalFileParser};
use crate::repository::hall_repo::HallRepository;
use crate::repository::student_repo::StudentRepository;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 导入结果摘要
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub imported: usize,
    pub skipped: usize,
    pub row_errors: Vec<String>,
}

/// 逐行映射并按主键去重（保留首次出现）
fn map_rows<T>(
    records: &[RawRecord],
    summary: &mut ImportSummary,
    map: impl Fn(&RawRecord, usize) -> ImportResult<T>,
    key: impl Fn(&T) -> String,
) -> Vec<T> {
    let mut seen = HashSet::new();
    let mut mapped = Vec::with_capacity(records.len());

    for (idx, record) in records.iter().enumerate() {
        // 表头为第 1 行
        let row_number = idx + 2;
        match map(record, row_number) {
            Ok(item) => {
                let k = key(&item);
                if seen.insert(k.clone()) {
                    mapped.push(item);
                } else {
                    warn!(row_number, key = %k, "主键重复，保留首次出现");
                    summary.skipped += 1;
                    summary.row_errors.push(format!("行 {}: 主键重复 {}", row_number, k));
                }
            }
            Err(e) => {
                warn!(row_number, error = %e, "行映射失败");
                summary.skipped += 1;
                summary.row_errors.push(e.to_string());
            }
        }
    }

    mapped
}

// ==========================================
// RosterImporter - 考生名单导入
// ==========================================
pub struct RosterImporter {
    students: Arc<StudentRepository>,
    parser: UniversalFileParser,
    mapper: FieldMapper,
}

impl RosterImporter {
    pub fn new(students: Arc<StudentRepository>) -> Self {
        Self {
            students,
            parser: UniversalFileParser,
            mapper: FieldMapper::new(),
        }
    }

    /// 解析名单文件（不落库），返回按文件行序排列的考生
    pub fn parse_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<(Vec<Student>, ImportSummary)> {
        let records = self.parser.parse(file_path)?;
        let mut summary = ImportSummary {
            total_rows: records.len(),
            ..Default::default()
        };
        if let Some(first) = records.first() {
            self.mapper.check_roster_columns(first)?;
        }

        let students = map_rows(
            &records,
            &mut summary,
            |r, n| self.mapper.map_student(r, n),
            |s| s.student_id.clone(),
        );
        summary.imported = students.len();
        Ok((students, summary))
    }

    /// 导入名单并登记到考试（替换该考试已有名单）
    #[instrument(skip(self, file_path))]
    pub fn import<P: AsRef<Path>>(&self, exam_id: &str, file_path: P) -> ImportResult<ImportSummary> {
        let path = file_path.as_ref();
        info!(file_path = %path.display(), "开始导入考生名单");

        let (students, summary) = self.parse_file(path)?;
        self.students.batch_upsert(&students)?;
        let ids: Vec<String> = students.iter().map(|s| s.student_id.clone()).collect();
        self.students.register_for_exam(exam_id, &ids)?;

        info!(
            total_rows = summary.total_rows,
            imported = summary.imported,
            skipped = summary.skipped,
            "考生名单导入完成"
        );
        Ok(summary)
    }
}

// ==========================================
// HallImporter - 考场导入
// ==========================================
pub struct HallImporter {
    halls: Arc<HallRepository>,
    parser: UniversalFileParser,
    mapper: FieldMapper,
}

impl HallImporter {
    pub fn new(halls: Arc<HallRepository>) -> Self {
        Self {
            halls,
            parser: UniversalFileParser,
            mapper: FieldMapper::new(),
        }
    }

    pub fn parse_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<(Vec<Hall>, ImportSummary)> {
        let records = self.parser.parse(file_path)?;
        let mut summary = ImportSummary {
            total_rows: records.len(),
            ..Default::default()
        };
        let Some(first) = records.first() else {
            return Err(ImportError::MissingColumn("hall_id".to_string()));
        };
        self.mapper.check_hall_columns(first)?;

        let halls = map_rows(
            &records,
            &mut summary,
            |r, n| self.mapper.map_hall(r, n),
            |h| h.hall_id.clone(),
        );
        summary.imported = halls.len();
        Ok((halls, summary))
    }

    /// 导入考场（文件行序即 sort_order）
    #[instrument(skip(self, file_path))]
    pub fn import<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ImportSummary> {
        let path = file_path.as_ref();
        info!(file_path = %path.display(), "开始导入考场");

        let (halls, summary) = self.parse_file(path)?;
        self.halls.batch_upsert(&halls)?;

        info!(
            total_rows = summary.total_rows,
            imported = summary.imported,
            skipped = summary.skipped,
            "考场导入完成"
        );
        Ok(summary)
    }
}
