// ==========================================
// 座位编排 API 端到端测试
// ==========================================
// 覆盖: 导入 → 创建运行 → 执行 → 查询
// 重点: 原子落库、失败标记、并发运行、配置默认值
// ==========================================

mod helpers;

use exam_seating::api::{ApiError, CreateRunRequest};
use exam_seating::app::AppState;
use exam_seating::config::config_keys;
use exam_seating::domain::types::{AdjacencyStrictness, RunStatus, SeatNumbering};
use exam_seating::domain::Hall;
use exam_seating::engine::{AllocationEngine, AllocationStore, RunCommit};
use exam_seating::repository::{AllocationRepository, RunRepository};
use helpers::test_data_builder::{hard_run, uniform_halls, RosterBuilder};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::Arc;
use tempfile::{Builder, NamedTempFile};
use test_helpers::{create_test_db, seed_halls, seed_roster, shared_connection};

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn setup(halls: &[Hall], exam_id: &str, students: usize) -> (NamedTempFile, AppState) {
    exam_seating::logging::init_test();
    let (temp, db_path) = create_test_db().unwrap();
    let conn = shared_connection(&db_path).unwrap();
    seed_halls(conn.clone(), halls).unwrap();
    let roster = RosterBuilder::new()
        .interleaved(&["A", "B", "C"], students)
        .build();
    seed_roster(conn.clone(), exam_id, &roster).unwrap();
    let state = AppState::from_connection(db_path, conn).unwrap();
    (temp, state)
}

// ==========================================
// 完整流程
// ==========================================

#[tokio::test]
async fn test_import_and_allocate_flow() {
    let (_temp, db_path) = create_test_db().unwrap();
    let state = AppState::new(db_path).unwrap();

    let halls_csv = write_csv(
        "考场编号,考场名称,行数,列数,启用\n\
         H1,一号考场,3,3,是\n\
         H2,二号考场,2,3,1\n\
         H3,备用考场,9,9,否\n",
    );
    let roster_csv = write_csv(
        "学号,姓名,班级\n\
         S01,张一,一班\n\
         S02,张二,一班\n\
         S03,李一,二班\n\
         S04,李二,二班\n\
         S05,王一,\n\
         S06,王二,三班\n",
    );

    let hall_resp = state
        .import_api
        .import_halls(halls_csv.path().to_str().unwrap())
        .unwrap();
    assert_eq!(hall_resp.summary.imported, 3);
    let roster_resp = state
        .import_api
        .import_roster("MATH-2026", roster_csv.path().to_str().unwrap())
        .unwrap();
    assert_eq!(roster_resp.summary.imported, 6);

    let run = state
        .allocation_api
        .create_run(CreateRunRequest::new("MATH-2026").with_seed("flow"))
        .await
        .unwrap();
    assert_eq!(run.status, RunStatus::Pending);
    assert!(run.config_snapshot_json.is_some());

    let outcome = state.allocation_api.execute_run(&run.run_id).await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.allocations.len(), 6);
    assert!(outcome.allocations.iter().all(|a| a.hall_id != "H3"));

    let view = state.allocation_api.get_run_result(&run.run_id).unwrap();
    assert_eq!(view.run.status, RunStatus::Completed);
    assert!(view.run.completed_at.is_some());
    assert_eq!(view.allocations.len(), 6);
    assert_eq!(view.conflicts.len(), outcome.conflicts.len());

    let persisted: HashMap<_, _> = view
        .allocations
        .iter()
        .map(|a| (a.student_id.clone(), (a.hall_id.clone(), a.row, a.column)))
        .collect();
    for a in &outcome.allocations {
        assert_eq!(
            persisted.get(&a.student_id),
            Some(&(a.hall_id.clone(), a.row, a.column))
        );
    }
}

#[tokio::test]
async fn test_replayed_seed_reproduces_layout() {
    let (_temp, state) = setup(&uniform_halls(2, 4, 4), "EXAM-1", 25);

    let first = state
        .allocation_api
        .create_run(CreateRunRequest::new("EXAM-1").with_seed("replay"))
        .await
        .unwrap();
    let second = state
        .allocation_api
        .create_run(CreateRunRequest::new("EXAM-1").with_seed("replay"))
        .await
        .unwrap();

    let a = state.allocation_api.execute_run(&first.run_id).await.unwrap();
    let b = state.allocation_api.execute_run(&second.run_id).await.unwrap();

    let layout = |o: &exam_seating::RunOutcome| {
        o.allocations
            .iter()
            .map(|x| (x.student_id.clone(), x.hall_id.clone(), x.row, x.column))
            .collect::<Vec<_>>()
    };
    assert_eq!(layout(&a), layout(&b));
    assert_eq!(state.allocation_api.list_runs("EXAM-1").unwrap().len(), 2);
}

// ==========================================
// 失败与原子性
// ==========================================

#[tokio::test]
async fn test_insufficient_capacity_marks_run_failed() {
    let (_temp, state) = setup(&uniform_halls(3, 5, 5), "EXAM-1", 80);

    let run = state
        .allocation_api
        .create_run(CreateRunRequest::new("EXAM-1").with_seed("too-many"))
        .await
        .unwrap();
    let err = state.allocation_api.execute_run(&run.run_id).await.unwrap_err();

    assert!(matches!(err, ApiError::AllocationRejected { ref stage, .. } if stage == "validating"));
    assert!(err.is_user_correctable());

    let view = state.allocation_api.get_run_result(&run.run_id).unwrap();
    assert_eq!(view.run.status, RunStatus::Failed);
    assert!(view.run.failure_reason.is_some());
    assert!(view.allocations.is_empty());
    assert!(view.conflicts.is_empty());
}

#[tokio::test]
async fn test_failed_rerun_clears_previous_result() {
    let (_temp, state) = setup(&uniform_halls(1, 3, 3), "EXAM-1", 4);

    let run = state
        .allocation_api
        .create_run(CreateRunRequest::new("EXAM-1").with_seed("rerun"))
        .await
        .unwrap();
    state.allocation_api.execute_run(&run.run_id).await.unwrap();
    let first = state.allocation_api.get_run_result(&run.run_id).unwrap();
    assert_eq!(first.allocations.len(), 4);
    assert!(first.run.completed_at.is_some());

    state.hall_repo.set_active("H1", false).unwrap();
    let err = state.allocation_api.execute_run(&run.run_id).await.unwrap_err();
    assert!(matches!(err, ApiError::AllocationRejected { .. }));

    let view = state.allocation_api.get_run_result(&run.run_id).unwrap();
    assert_eq!(view.run.status, RunStatus::Failed);
    assert!(view.run.completed_at.is_none());
    assert!(view.allocations.is_empty());
    assert!(view.conflicts.is_empty());
}

#[tokio::test]
async fn test_no_active_halls_rejected() {
    let halls = vec![Hall::new("H1", 5, 5).inactive()];
    let (_temp, state) = setup(&halls, "EXAM-1", 3);

    let run = state
        .allocation_api
        .create_run(CreateRunRequest::new("EXAM-1"))
        .await
        .unwrap();
    let err = state.allocation_api.execute_run(&run.run_id).await.unwrap_err();
    assert!(matches!(err, ApiError::AllocationRejected { .. }));
}

#[tokio::test]
async fn test_unknown_run_is_not_found() {
    let (_temp, state) = setup(&uniform_halls(1, 2, 2), "EXAM-1", 2);
    let err = state.allocation_api.execute_run("missing").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn test_sqlite_commit_is_all_or_nothing() {
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = shared_connection(&db_path).unwrap();
    let runs = RunRepository::from_connection(conn.clone());
    let store = Arc::new(AllocationRepository::from_connection(conn.clone()));

    let run = hard_run("atomic");
    runs.create(&run).unwrap();

    let engine = AllocationEngine::new(store.clone());
    let roster = RosterBuilder::new().interleaved(&["A", "B"], 6).build();
    let plan = engine.plan(&run, &uniform_halls(1, 3, 3), &roster).unwrap();

    // 人为制造座位重复
    let mut broken = plan.allocations.clone();
    broken[1].row = broken[0].row;
    broken[1].column = broken[0].column;
    let commit = RunCommit {
        run: &run,
        allocations: &broken,
        conflicts: &[],
        completed_at: chrono::Utc::now(),
    };
    assert!(store.commit_run(&commit).is_err());

    assert!(store.list_allocations(&run.run_id).unwrap().is_empty());
    let reloaded = runs.find_by_id(&run.run_id).unwrap().unwrap();
    assert_eq!(reloaded.status, RunStatus::Pending);
}

// ==========================================
// 并发
// ==========================================

#[tokio::test]
async fn test_concurrent_runs_do_not_interfere() {
    let (_temp, state) = setup(&uniform_halls(2, 5, 5), "EXAM-1", 40);

    let mut run_ids = Vec::new();
    for seed in ["c-1", "c-2", "c-3", "c-4"] {
        let run = state
            .allocation_api
            .create_run(CreateRunRequest::new("EXAM-1").with_seed(seed))
            .await
            .unwrap();
        run_ids.push(run.run_id);
    }

    let results = state.allocation_api.execute_runs(&run_ids).await;
    assert_eq!(results.len(), 4);

    for (run_id, result) in run_ids.iter().zip(results) {
        let outcome = result.unwrap();
        assert_eq!(&outcome.run_id, run_id);

        let view = state.allocation_api.get_run_result(run_id).unwrap();
        assert_eq!(view.allocations.len(), 40);
        assert!(view.allocations.iter().all(|a| &a.run_id == run_id));
        let seats: HashSet<_> = view
            .allocations
            .iter()
            .map(|a| (a.hall_id.clone(), a.row, a.column))
            .collect();
        assert_eq!(seats.len(), 40);
    }
}

// ==========================================
// 配置默认值
// ==========================================

#[tokio::test]
async fn test_run_defaults_come_from_config() {
    let (_temp, state) = setup(&uniform_halls(1, 4, 4), "EXAM-1", 10);
    state
        .config
        .set_global_config_value(config_keys::SEAT_NUMBERING_DEFAULT, "column_major")
        .unwrap();
    state
        .config
        .set_global_config_value(config_keys::ADJACENCY_STRICTNESS_DEFAULT, "soft")
        .unwrap();
    state
        .config
        .set_global_config_value(config_keys::SEED_PREFIX, "spring")
        .unwrap();

    let run = state
        .allocation_api
        .create_run(CreateRunRequest::new("EXAM-1"))
        .await
        .unwrap();

    assert_eq!(run.seat_numbering, SeatNumbering::ColumnMajor);
    assert_eq!(run.adjacency_strictness, AdjacencyStrictness::Soft);
    assert_eq!(run.seed, format!("spring-{}", run.run_id));

    let snapshot: serde_json::Value =
        serde_json::from_str(run.config_snapshot_json.as_deref().unwrap()).unwrap();
    assert_eq!(snapshot["seed_prefix"], "spring");

    let outcome = state.allocation_api.execute_run(&run.run_id).await.unwrap();
    for a in &outcome.allocations {
        assert_eq!(a.seat_number, (a.column - 1) * 4 + a.row);
    }
}

#[tokio::test]
async fn test_empty_exam_id_rejected() {
    let (_temp, state) = setup(&uniform_halls(1, 2, 2), "EXAM-1", 2);
    let err = state
        .allocation_api
        .create_run(CreateRunRequest::new("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}
