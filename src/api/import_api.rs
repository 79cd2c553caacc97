// ==========================================
// 考场座位编排引擎 - 导入API
// ==========================================
// 职责: 封装考场/名单导入
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::importer::{HallImporter, ImportSummary, RosterImporter};
use crate::repository::{HallRepository, StudentRepository};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    #[serde(flatten)]
    pub summary: ImportSummary,
    /// 导入耗时（毫秒）
    pub elapsed_ms: i64,
}

pub struct ImportApi {
    halls: HallImporter,
    roster: RosterImporter,
}

impl ImportApi {
    pub fn new(halls: Arc<HallRepository>, students: Arc<StudentRepository>) -> Self {
        Self {
            halls: HallImporter::new(halls),
            roster: RosterImporter::new(students),
        }
    }

    pub fn import_halls(&self, file_path: &str) -> ApiResult<ImportApiResponse> {
        let started = Instant::now();
        let summary = self.halls.import(Path::new(file_path))?;
        Ok(ImportApiResponse {
            summary,
            elapsed_ms: started.elapsed().as_millis() as i64,
        })
    }

    pub fn import_roster(&self, exam_id: &str, file_path: &str) -> ApiResult<ImportApiResponse> {
        if exam_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("exam_id 不能为空".to_string()));
        }
        let started = Instant::now();
        let summary = self.roster.import(exam_id.trim(), Path::new(file_path))?;
        Ok(ImportApiResponse {
            summary,
            elapsed_ms: started.elapsed().as_millis() as i64,
        })
    }
}
