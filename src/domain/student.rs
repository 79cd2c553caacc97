// ==========================================
// 考场座位编排引擎 - 考生领域模型
// ==========================================

use serde::{Deserialize, Serialize};

/// 无班级考生的分组键
pub const UNASSIGNED_CLASS_GROUP: &str = "unassigned";

// ==========================================
// Student - 考生
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: String,
    pub full_name: Option<String>,
    pub class_group: Option<String>, // 班级/年级键，空白视为缺失
}

impl Student {
    pub fn new(student_id: impl Into<String>, class_group: Option<&str>) -> Self {
        Self {
            student_id: student_id.into(),
            full_name: None,
            class_group: normalize_class_group(class_group),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = Some(name.into());
        self
    }

    /// 分组键（缺失班级归入 "unassigned"）
    pub fn group_key(&self) -> &str {
        self.class_group.as_deref().unwrap_or(UNASSIGNED_CLASS_GROUP)
    }
}

/// 清洗班级字段: 去除首尾空白，空串与 "unassigned" 视为 None
pub fn normalize_class_group(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(UNASSIGNED_CLASS_GROUP))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_key_falls_back_to_unassigned() {
        assert_eq!(Student::new("S1", Some("7A")).group_key(), "7A");
        assert_eq!(Student::new("S2", None).group_key(), UNASSIGNED_CLASS_GROUP);
        assert_eq!(Student::new("S3", Some("   ")).group_key(), UNASSIGNED_CLASS_GROUP);
        assert_eq!(Student::new("S4", Some(" 8B ")).class_group.as_deref(), Some("8B"));
    }

    #[test]
    fn test_unassigned_literal_is_no_class() {
        assert_eq!(normalize_class_group(Some("unassigned")), None);
        assert_eq!(normalize_class_group(Some(" Unassigned ")), None);
        assert_eq!(Student::new("S1", Some("unassigned")).class_group, None);
    }
}
