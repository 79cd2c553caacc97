// ==========================================
// 考场座位编排引擎 - 编排API
// ==========================================
// 职责: 创建运行 → 执行运行 → 查询结果
// 引擎为同步计算，放入 spawn_blocking 执行，不阻塞异步运行时
// 多个运行可并发执行；每个运行拥有独立 PRNG，互不影响
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{AllocationConfigReader, ConfigManager};
use crate::domain::allocation::Allocation;
use crate::domain::run::AllocationRun;
use crate::domain::types::{AdjacencyStrictness, SeatNumbering};
use crate::engine::orchestrator::{AllocationEngine, EngineConfig, RunOutcome};
use crate::repository::{
    AllocationRepository, HallRepository, RunRepository, SeatConflictEntity, StudentRepository,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 创建运行请求（未填写的参数取配置默认值）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateRunRequest {
    pub exam_id: String,
    pub seed: Option<String>,
    pub seat_numbering: Option<SeatNumbering>,
    pub adjacency_strictness: Option<AdjacencyStrictness>,
}

impl CreateRunRequest {
    pub fn new(exam_id: impl Into<String>) -> Self {
        Self {
            exam_id: exam_id.into(),
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = Some(seed.into());
        self
    }
}

/// 已落库的运行结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResultView {
    pub run: AllocationRun,
    pub allocations: Vec<Allocation>,
    pub conflicts: Vec<SeatConflictEntity>,
}

pub struct AllocationApi {
    runs: Arc<RunRepository>,
    halls: Arc<HallRepository>,
    students: Arc<StudentRepository>,
    allocations: Arc<AllocationRepository>,
    config: Arc<ConfigManager>,
}

impl AllocationApi {
    pub fn new(
        runs: Arc<RunRepository>,
        halls: Arc<HallRepository>,
        students: Arc<StudentRepository>,
        allocations: Arc<AllocationRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            runs,
            halls,
            students,
            allocations,
            config,
        }
    }

    /// 创建运行（PENDING），记录参数与配置快照
    #[instrument(skip(self, request), fields(exam_id = %request.exam_id))]
    pub async fn create_run(&self, request: CreateRunRequest) -> ApiResult<AllocationRun> {
        let exam_id = request.exam_id.trim();
        if exam_id.is_empty() {
            return Err(ApiError::InvalidInput("exam_id 不能为空".to_string()));
        }

        let seat_numbering = match request.seat_numbering {
            Some(v) => v,
            None => self
                .config
                .get_default_seat_numbering()
                .await
                .map_err(|e| ApiError::ConfigError(e.to_string()))?,
        };
        let adjacency_strictness = match request.adjacency_strictness {
            Some(v) => v,
            None => self
                .config
                .get_default_adjacency_strictness()
                .await
                .map_err(|e| ApiError::ConfigError(e.to_string()))?,
        };

        let mut run = AllocationRun::new(exam_id, String::new(), seat_numbering, adjacency_strictness);
        run.seed = match request.seed.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
            Some(seed) => seed,
            None => {
                let prefix = self
                    .config
                    .get_seed_prefix()
                    .await
                    .map_err(|e| ApiError::ConfigError(e.to_string()))?;
                format!("{}-{}", prefix, run.run_id)
            }
        };
        run.config_snapshot_json = Some(
            self.config
                .get_config_snapshot()
                .map_err(|e| ApiError::ConfigError(e.to_string()))?,
        );

        self.runs.create(&run)?;
        info!(run_id = %run.run_id, seed = %run.seed, "运行已创建");
        Ok(run)
    }

    /// 执行运行: 读取考场与名单 → 引擎计算 → 原子落库
    ///
    /// 失败时运行被标记为 FAILED，且不存在任何分配记录
    #[instrument(skip(self))]
    pub async fn execute_run(&self, run_id: &str) -> ApiResult<RunOutcome> {
        let run = self.runs.find_by_id(run_id)?.ok_or_else(|| {
            ApiError::NotFound(format!("AllocationRun(id={})不存在", run_id))
        })?;

        let halls = self.halls.list_all()?;
        let roster = self.students.list_roster(&run.exam_id)?;
        let engine_config = EngineConfig::load(self.config.as_ref())
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let store = self.allocations.clone();
        let job_run = run.clone();
        let result = tokio::task::spawn_blocking(move || {
            AllocationEngine::with_config(store, engine_config).run(&job_run, &halls, &roster)
        })
        .await
        .map_err(|e| ApiError::InternalError(format!("编排任务异常终止: {}", e)))?;

        match result {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                if let Err(mark_err) = self.runs.mark_failed(&run.run_id, &err.to_string()) {
                    warn!(error = %mark_err, "标记运行失败状态时出错");
                }
                Err(ApiError::from(err))
            }
        }
    }

    /// 并发执行多个运行（结果顺序与输入一致）
    pub async fn execute_runs(&self, run_ids: &[String]) -> Vec<ApiResult<RunOutcome>> {
        join_all(run_ids.iter().map(|id| self.execute_run(id))).await
    }

    /// 查询已落库的运行结果
    pub fn get_run_result(&self, run_id: &str) -> ApiResult<RunResultView> {
        let run = self.runs.find_by_id(run_id)?.ok_or_else(|| {
            ApiError::NotFound(format!("AllocationRun(id={})不存在", run_id))
        })?;
        let allocations = self.allocations.list_allocations(run_id)?;
        let conflicts = self.allocations.list_conflicts(run_id)?;
        Ok(RunResultView {
            run,
            allocations,
            conflicts,
        })
    }

    pub fn list_runs(&self, exam_id: &str) -> ApiResult<Vec<AllocationRun>> {
        Ok(self.runs.list_by_exam(exam_id)?)
    }
}
