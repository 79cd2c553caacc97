// ==========================================
// 考场座位编排引擎 - 导入层
// ==========================================
// 职责: 外部数据导入（考生名单、考场布局）
// 支持: Excel, CSV
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod roster_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRecord, UniversalFileParser};
pub use roster_importer::{HallImporter, ImportSummary, RosterImporter};
