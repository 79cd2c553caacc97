// ==========================================
// AllocationEngine 集成测试
// ==========================================
// 测试范围:
// 1. 确定性: 同 seed 同输入 → 同结果
// 2. 容量: 一座一人、一人一座、容量不足拒绝
// 3. 冲突: soft 只报告、hard 修复、修复预算
// 4. 落库: 失败时整体回滚
// ==========================================

mod helpers;

use exam_seating::domain::types::{AdjacencyStrictness, ConflictType, SeatNumbering};
use exam_seating::domain::{Hall, SeatConflict, Student};
use exam_seating::engine::{
    AllocationEngine, AllocationStore, ConflictDetector, EngineConfig, EngineError, EngineStage,
    MemoryAllocationStore, RunCommit, RunWarning,
};
use exam_seating::repository::{RepositoryError, RepositoryResult};
use helpers::mock_config::MockConfig;
use helpers::test_data_builder::{hard_run, run, soft_run, uniform_halls, RosterBuilder};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

fn memory_engine() -> (AllocationEngine<MemoryAllocationStore>, Arc<MemoryAllocationStore>) {
    exam_seating::logging::init_test();
    let store = Arc::new(MemoryAllocationStore::new());
    (AllocationEngine::new(store.clone()), store)
}

struct FailingStore;

impl AllocationStore for FailingStore {
    fn commit_run(&self, _commit: &RunCommit<'_>) -> RepositoryResult<Vec<i64>> {
        Err(RepositoryError::DatabaseTransactionError("模拟写入失败".to_string()))
    }
}

// ==========================================
// 确定性
// ==========================================

#[test]
fn test_same_seed_same_allocation() {
    let (engine, _) = memory_engine();
    let roster = RosterBuilder::new().class("A", 20).class("B", 15).class("C", 10).build();
    let halls = uniform_halls(2, 5, 5);

    let run_a = hard_run("2026-spring-math");
    let run_b = hard_run("2026-spring-math").with_run_id(run_a.run_id.clone());

    let a = engine.run(&run_a, &halls, &roster).unwrap();
    let b = engine.run(&run_b, &halls, &roster).unwrap();

    let seats = |o: &exam_seating::RunOutcome| {
        o.allocations
            .iter()
            .map(|x| (x.student_id.clone(), x.hall_id.clone(), x.row, x.column))
            .collect::<Vec<_>>()
    };
    assert_eq!(seats(&a), seats(&b));
    assert_eq!(a.conflicts, b.conflicts);
    assert_eq!(a.metadata.derived_seed, b.metadata.derived_seed);
}

#[test]
fn test_different_seed_changes_arrangement() {
    let (engine, _) = memory_engine();
    let roster = RosterBuilder::new().class("A", 30).class("B", 30).build();
    let halls = uniform_halls(1, 8, 8);

    let a = engine.plan(&soft_run("seed-1"), &halls, &roster).unwrap();
    let b = engine.plan(&soft_run("seed-2"), &halls, &roster).unwrap();

    let by_student = |p: &exam_seating::engine::AllocationPlan| {
        p.allocations
            .iter()
            .map(|x| (x.student_id.clone(), (x.row, x.column)))
            .collect::<HashMap<_, _>>()
    };
    assert_ne!(by_student(&a), by_student(&b));
}

// ==========================================
// 容量
// ==========================================

#[test]
fn test_every_student_gets_one_unique_seat() {
    let (engine, _) = memory_engine();
    let roster = RosterBuilder::new()
        .class("A", 31)
        .class("B", 22)
        .class("C", 17)
        .unassigned(5)
        .build();
    let halls = vec![Hall::new("H1", 5, 5), Hall::new("H2", 5, 6), Hall::new("H3", 4, 5)];

    let outcome = engine.run(&hard_run("cap"), &halls, &roster).unwrap();
    assert_eq!(outcome.allocations.len(), roster.len());

    let seats: HashSet<_> = outcome
        .allocations
        .iter()
        .map(|a| (a.hall_id.clone(), a.row, a.column))
        .collect();
    assert_eq!(seats.len(), roster.len());

    let students: HashSet<_> = outcome.allocations.iter().map(|a| a.student_id.clone()).collect();
    assert_eq!(students.len(), roster.len());

    let shapes: HashMap<&str, &Hall> = halls.iter().map(|h| (h.hall_id.as_str(), h)).collect();
    for a in &outcome.allocations {
        let hall = shapes[a.hall_id.as_str()];
        assert!(a.row >= 1 && a.row <= hall.rows);
        assert!(a.column >= 1 && a.column <= hall.columns);
        assert_eq!(a.seat_number, SeatNumbering::RowMajor.seat_number(a.row, a.column, hall.rows, hall.columns));
    }
}

#[test]
fn test_insufficient_capacity_is_rejected_before_assignment() {
    let (engine, store) = memory_engine();
    let roster = RosterBuilder::new().interleaved(&["A", "B", "C", "D"], 80).build();
    let halls = uniform_halls(3, 5, 5);

    let err = engine.run(&hard_run("cap"), &halls, &roster).unwrap_err();

    assert_eq!(err.stage, EngineStage::Validating);
    assert!(matches!(
        err.source,
        EngineError::InsufficientCapacity {
            roster_size: 80,
            total_capacity: 75
        }
    ));
    assert!(err.is_user_correctable());
    assert_eq!(store.run_count(), 0);
}

#[test]
fn test_exact_capacity_succeeds() {
    let (engine, _) = memory_engine();
    let roster = RosterBuilder::new().interleaved(&["A", "B", "C"], 75).build();
    let outcome = engine
        .run(&soft_run("exact"), &uniform_halls(3, 5, 5), &roster)
        .unwrap();
    assert_eq!(outcome.summary.allocations_count, 75);
    assert_eq!(outcome.summary.halls_used, 3);
}

#[test]
fn test_inactive_halls_are_ignored() {
    let (engine, _) = memory_engine();
    let roster = RosterBuilder::new().class("A", 3).build();

    let all_inactive = vec![Hall::new("H1", 5, 5).inactive()];
    let err = engine.run(&hard_run("x"), &all_inactive, &roster).unwrap_err();
    assert!(matches!(err.source, EngineError::NoActiveHalls));

    let mixed = vec![Hall::new("BIG", 9, 9).inactive(), Hall::new("SMALL", 2, 2)];
    let outcome = engine.run(&hard_run("x"), &mixed, &roster).unwrap();
    assert!(outcome.allocations.iter().all(|a| a.hall_id == "SMALL"));
}

#[test]
fn test_duplicate_student_is_rejected() {
    let (engine, _) = memory_engine();
    let roster = vec![Student::new("S1", Some("A")), Student::new("S1", Some("B"))];
    let err = engine
        .run(&hard_run("dup"), &uniform_halls(1, 2, 2), &roster)
        .unwrap_err();
    assert!(matches!(err.source, EngineError::DuplicateStudent { ref student_id } if student_id == "S1"));
}

#[test]
fn test_no_halls_reported_before_duplicate_student() {
    let (engine, store) = memory_engine();
    let roster = vec![Student::new("S1", Some("A")), Student::new("S1", Some("A"))];

    let err = engine.run(&hard_run("dup"), &[], &roster).unwrap_err();
    assert_eq!(err.stage, EngineStage::Validating);
    assert!(matches!(err.source, EngineError::NoActiveHalls));

    let inactive = vec![Hall::new("H1", 3, 3).inactive()];
    let err = engine.run(&hard_run("dup"), &inactive, &roster).unwrap_err();
    assert!(matches!(err.source, EngineError::NoActiveHalls));
    assert_eq!(store.run_count(), 0);
}

#[test]
fn test_empty_roster_completes_with_no_allocations() {
    let (engine, _) = memory_engine();
    let outcome = engine.run(&hard_run("empty"), &uniform_halls(1, 3, 3), &[]).unwrap();
    assert!(outcome.success);
    assert!(outcome.allocations.is_empty());
    assert_eq!(outcome.summary.halls_used, 0);
}

// ==========================================
// 座位顺序与编号
// ==========================================

#[test]
fn test_checkerboard_seats_used_first() {
    let (engine, _) = memory_engine();
    // 5x5 共 13 个主座位
    let roster = RosterBuilder::new().interleaved(&["A", "B"], 13).build();
    let outcome = engine
        .run(&soft_run("board"), &uniform_halls(1, 5, 5), &roster)
        .unwrap();

    assert!(outcome.allocations.iter().all(|a| (a.row + a.column) % 2 == 0));
    // 主座位之间不存在左右/前后相邻
    assert!(outcome.conflicts.is_empty());
}

#[test]
fn test_column_major_numbering() {
    let (engine, _) = memory_engine();
    let roster = RosterBuilder::new().interleaved(&["A", "B"], 12).build();
    let outcome = engine
        .run(
            &run("cols", SeatNumbering::ColumnMajor, AdjacencyStrictness::Soft),
            &uniform_halls(1, 3, 4),
            &roster,
        )
        .unwrap();

    for a in &outcome.allocations {
        assert_eq!(a.seat_number, (a.column - 1) * 3 + a.row);
    }
    assert_eq!(outcome.metadata.seat_numbering, SeatNumbering::ColumnMajor);
}

// ==========================================
// 冲突检测与修复
// ==========================================

#[test]
fn test_soft_mode_reports_single_adjacent_conflict() {
    let (engine, _) = memory_engine();
    let roster = RosterBuilder::new().class("A", 2).build();
    let outcome = engine
        .run(&soft_run("pair"), &uniform_halls(1, 1, 2), &roster)
        .unwrap();

    assert_eq!(outcome.conflicts.len(), 1);
    assert_eq!(outcome.conflicts[0].conflict_type, ConflictType::SameClassAdjacent);
    assert!(!outcome.conflicts[0].resolved);
    assert!(!outcome.stages.contains(&EngineStage::Resolving));
}

#[test]
fn test_two_by_two_interleaving() {
    // A1→1, B1→4, A2→2, B2→3: 两个班各占一行，左右相邻两处
    let roster = vec![
        Student::new("A1", Some("A")),
        Student::new("A2", Some("A")),
        Student::new("B1", Some("B")),
        Student::new("B2", Some("B")),
    ];
    let halls = uniform_halls(1, 2, 2);
    let (engine, _) = memory_engine();

    let soft = engine.run(&soft_run("tiny"), &halls, &roster).unwrap();
    assert_eq!(soft.conflicts.len(), 2);
    assert!(soft
        .conflicts
        .iter()
        .all(|c| c.conflict_type == ConflictType::SameClassAdjacent));

    let hard = engine.run(&hard_run("tiny"), &halls, &roster).unwrap();
    assert_eq!(hard.summary.conflicts_count, 0);
    assert!(hard.warnings.is_empty());
    assert!(hard.conflicts.iter().all(|c| c.resolved));
    assert!(ConflictDetector::new().detect(&hard.allocations).is_empty());
}

#[test]
fn test_unassigned_students_never_conflict() {
    let (engine, _) = memory_engine();
    let roster = RosterBuilder::new().unassigned(9).build();
    let outcome = engine
        .run(&soft_run("free"), &uniform_halls(1, 3, 3), &roster)
        .unwrap();
    assert!(outcome.conflicts.is_empty());
    assert_eq!(outcome.metadata.class_distribution.get("unassigned"), Some(&9));
}

#[test]
fn test_literal_unassigned_class_is_treated_as_no_class() {
    let (engine, _) = memory_engine();
    let roster = vec![
        Student {
            student_id: "S1".to_string(),
            full_name: None,
            class_group: Some("unassigned".to_string()),
        },
        Student::new("S2", None),
    ];
    let outcome = engine
        .run(&soft_run("literal"), &uniform_halls(1, 1, 2), &roster)
        .unwrap();

    assert!(outcome.conflicts.is_empty());
    assert!(outcome.allocations.iter().all(|a| a.class_group.is_none()));
    assert_eq!(outcome.metadata.class_distribution.get("unassigned"), Some(&2));
}

#[test]
fn test_hard_mode_reduces_conflicts() {
    let (engine, _) = memory_engine();
    let roster = RosterBuilder::new().class("A", 30).class("B", 10).build();
    let halls = uniform_halls(1, 5, 8);

    let soft = engine.run(&soft_run("dense"), &halls, &roster).unwrap();
    let hard = engine.run(&hard_run("dense"), &halls, &roster).unwrap();

    assert!(hard.summary.conflicts_count <= soft.summary.conflicts_count);
    // 输出的未修复冲突与最终布局一致
    let remaining: Vec<SeatConflict> = hard.conflicts.iter().filter(|c| !c.resolved).cloned().collect();
    assert_eq!(remaining, ConflictDetector::new().detect(&hard.allocations));
}

#[tokio::test]
async fn test_resolution_respects_attempt_budget() {
    let config = EngineConfig::load(&MockConfig::with_max_attempts(5)).await.unwrap();
    assert_eq!(config.max_resolve_attempts, 5);

    let engine = AllocationEngine::with_config(Arc::new(MemoryAllocationStore::new()), config);
    let roster = RosterBuilder::new().class("A", 18).class("B", 2).build();
    let outcome = engine
        .run(&hard_run("budget"), &uniform_halls(1, 4, 5), &roster)
        .unwrap();

    assert!(outcome.metadata.resolve_attempts <= 5);
    match outcome.warnings.as_slice() {
        [RunWarning::UnresolvedConflicts { remaining, attempts }] => {
            assert!(*attempts <= 5);
            assert_eq!(*remaining, outcome.summary.conflicts_count);
        }
        other => panic!("期望未修复冲突提示, 实际 {:?}", other),
    }
}

// ==========================================
// 落库
// ==========================================

#[test]
fn test_persistence_failure_reports_stage() {
    let engine = AllocationEngine::new(Arc::new(FailingStore));
    let roster = RosterBuilder::new().class("A", 4).build();
    let err = engine
        .run(&hard_run("fail"), &uniform_halls(1, 3, 3), &roster)
        .unwrap_err();

    assert_eq!(err.stage, EngineStage::Persisting);
    assert!(matches!(err.source, EngineError::Persistence(_)));
    assert!(!err.is_user_correctable());
}

#[test]
fn test_memory_store_holds_committed_run() {
    let (engine, store) = memory_engine();
    let roster = RosterBuilder::new().interleaved(&["A", "B"], 6).build();
    let run = hard_run("mem");
    let outcome = engine.run(&run, &uniform_halls(1, 3, 3), &roster).unwrap();

    let committed = store.get(&run.run_id).unwrap();
    assert_eq!(committed.allocations.len(), 6);
    assert_eq!(committed.allocations, outcome.allocations);
    assert_eq!(committed.completed_at, outcome.completed_at);
}
