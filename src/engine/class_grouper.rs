// ==========================================
// 考场座位编排引擎 - 班级分组
// ==========================================
// 分组顺序 = 班级键在名单中首次出现的顺序（不按字母序）
// 组内顺序 = 名单原始顺序（洗牌在后续步骤）
// ==========================================

use crate::domain::student::Student;
use std::collections::HashMap;

/// 单个班级分组
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassGroup {
    pub key: String,
    pub students: Vec<Student>,
}

/// 有序分组映射
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassGroups {
    groups: Vec<ClassGroup>,
}

impl ClassGroups {
    pub fn iter(&self) -> impl Iterator<Item = &ClassGroup> {
        self.groups.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ClassGroup> {
        self.groups.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.key.as_str()).collect()
    }

    pub fn get(&self, key: &str) -> Option<&ClassGroup> {
        self.groups.iter().find(|g| g.key == key)
    }

    pub fn total_students(&self) -> usize {
        self.groups.iter().map(|g| g.students.len()).sum()
    }
}

// ==========================================
// ClassGrouper - 班级分组器
// ==========================================
pub struct ClassGrouper;

impl ClassGrouper {
    pub fn new() -> Self {
        Self
    }

    pub fn group(&self, roster: &[Student]) -> ClassGroups {
        let mut groups: Vec<ClassGroup> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for student in roster {
            let key = student.group_key();
            let slot = match index.get(key) {
                Some(&i) => i,
                None => {
                    groups.push(ClassGroup {
                        key: key.to_string(),
                        students: Vec::new(),
                    });
                    index.insert(key, groups.len() - 1);
                    groups.len() - 1
                }
            };
            groups[slot].students.push(student.clone());
        }

        ClassGroups { groups }
    }
}

impl Default for ClassGrouper {
    fn default() -> Self {
        Self::new()
    }
}
