// ==========================================
// 考场 / 考生名单导入集成测试
// ==========================================


use exam_seating::importer::{HallImporter, ImportError, RosterImporter};
use exam_seating::repository::{HallRepository, StudentRepository};
use std::io::Write;
use std::sync::Arc;
use tempfile::{Builder, NamedTempFile};
use test_helpers::{create_test_db, shared_connection};

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn repos() -> (NamedTempFile, Arc<HallRepository>, Arc<StudentRepository>) {
    let (temp, db_path) = create_test_db().unwrap();
    let conn = shared_connection(&db_path).unwrap();
    (
        temp,
        Arc::new(HallRepository::from_connection(conn.clone())),
        Arc::new(StudentRepository::from_connection(conn)),
    )
}

#[test]
fn test_hall_import_keeps_file_order_and_skips_bad_rows() {
    let (_temp, halls, _) = repos();
    let csv = write_csv(
        "hall_id,hall_name,rows,columns,active\n\
         B-201,二楼,4,6,true\n\
         A-101,一楼,0,5,true\n\
         A-102,一楼,5.0,5,no\n\
         B-201,重复,3,3,true\n",
    );

    let summary = HallImporter::new(halls.clone()).import(csv.path()).unwrap();
    assert_eq!(summary.total_rows, 4);
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.row_errors.len(), 2);

    let all = halls.list_all().unwrap();
    let ids: Vec<_> = all.iter().map(|h| h.hall_id.as_str()).collect();
    assert_eq!(ids, vec!["B-201", "A-102"]);
    assert_eq!(all[1].rows, 5);
    assert!(!all[1].active);

    let active = halls.list_active().unwrap();
    assert_eq!(active.len(), 1);
}

#[test]
fn test_hall_import_requires_shape_columns() {
    let (_temp, halls, _) = repos();
    let csv = write_csv("hall_id,rows\nH1,5\n");
    let err = HallImporter::new(halls).import(csv.path()).unwrap_err();
    assert!(matches!(err, ImportError::MissingColumn(ref c) if c == "columns"));
}

#[test]
fn test_roster_import_registers_students_in_order() {
    let (_temp, _, students) = repos();
    let csv = write_csv(
        "考号,姓名,班级\n\
         S3,丙,  一班 \n\
         S1,甲,\n\
         ,无名,二班\n\
         S2,乙,二班\n",
    );

    let summary = RosterImporter::new(students.clone())
        .import("EXAM-1", csv.path())
        .unwrap();
    assert_eq!(summary.imported, 3);
    assert_eq!(summary.skipped, 1);

    let roster = students.list_roster("EXAM-1").unwrap();
    let ids: Vec<_> = roster.iter().map(|s| s.student_id.as_str()).collect();
    assert_eq!(ids, vec!["S3", "S1", "S2"]);
    assert_eq!(roster[0].class_group.as_deref(), Some("一班"));
    assert_eq!(roster[1].class_group, None);
}

#[test]
fn test_reimport_replaces_registration() {
    let (_temp, _, students) = repos();
    let importer = RosterImporter::new(students.clone());

    importer
        .import("EXAM-1", write_csv("student_id,class_group\nS1,A\nS2,A\n").path())
        .unwrap();
    importer
        .import("EXAM-1", write_csv("student_id,class_group\nS2,B\n").path())
        .unwrap();

    let roster = students.list_roster("EXAM-1").unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].student_id, "S2");
    assert_eq!(roster[0].class_group.as_deref(), Some("B"));
    assert!(students.list_roster("EXAM-2").unwrap().is_empty());
}

#[test]
fn test_unsupported_extension_rejected() {
    let (_temp, _, students) = repos();
    let mut file = Builder::new().suffix(".txt").tempfile().unwrap();
    writeln!(file, "student_id\nS1").unwrap();
    let err = RosterImporter::new(students)
        .import("EXAM-1", file.path())
        .unwrap_err();
    assert!(matches!(err, ImportError::UnsupportedFormat(_)));
}
