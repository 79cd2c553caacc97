// ==========================================
// 考场座位编排引擎 - 引擎编排器
// ==========================================
// 用途: 协调各组件的执行顺序，驱动运行状态机
// 流程:
//   Validating → Grouping → Shuffling → Assigning → DetectingConflicts
//     → [Resolving, 仅 hard 且存在冲突] → Persisting → Aggregating → Completed
// 红线:
// - 所有随机性来自运行种子派生的 PRNG（运行内局部变量）
// - 落库前不产生任何外部可见副作用；落库整批原子
// ==========================================

use crate::config::{AllocationConfigReader, ConfigResult};
use crate::domain::allocation::{Allocation, SeatConflict};
use crate::domain::hall::Hall;
use crate::domain::run::AllocationRun;
use crate::domain::student::Student;
use crate::domain::types::AdjacencyStrictness;
use crate::engine::capacity_validator::CapacityValidator;
use crate::engine::class_grouper::ClassGrouper;
use crate::engine::conflict_detector::ConflictDetector;
use crate::engine::conflict_resolver::{ConflictResolver, ResolveReport, MAX_RESOLVE_ATTEMPTS};
use crate::engine::error::{EngineError, EngineStage, RunError};
use crate::engine::metadata::{MetadataAggregator, RunMetadata};
use crate::engine::round_robin::RoundRobinAllocator;
use crate::engine::shuffler::SeededShuffler;
use crate::engine::store::{AllocationStore, RunCommit};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

// ==========================================
// EngineConfig - 引擎参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub max_resolve_attempts: usize,
}

impl EngineConfig {
    /// 从配置读取器加载
    pub async fn load<C>(reader: &C) -> ConfigResult<Self>
    where
        C: AllocationConfigReader + ?Sized,
    {
        let max_attempts = reader.get_resolve_max_attempts().await?;
        Ok(Self::default().with_max_resolve_attempts(max_attempts))
    }

    /// 上限会被限制在 1..=MAX_RESOLVE_ATTEMPTS
    pub fn with_max_resolve_attempts(mut self, max_attempts: usize) -> Self {
        self.max_resolve_attempts = max_attempts.clamp(1, MAX_RESOLVE_ATTEMPTS);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_resolve_attempts: MAX_RESOLVE_ATTEMPTS,
        }
    }
}

// ==========================================
// 运行结果
// ==========================================

/// 非致命提示（运行仍然成功）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunWarning {
    /// hard 模式下修复预算耗尽或无可交换对象，仍有冲突
    UnresolvedConflicts { remaining: usize, attempts: usize },
}

/// 计算结果（未落库）
#[derive(Debug, Clone)]
pub struct AllocationPlan {
    pub run_id: String,
    pub allocations: Vec<Allocation>,
    /// 已消除的初始冲突（resolved=true）在前，最终仍存在的冲突在后
    pub conflicts: Vec<SeatConflict>,
    pub resolve_report: Option<ResolveReport>,
    pub stages: Vec<EngineStage>,
    pub derived_seed: u64,
}

impl AllocationPlan {
    pub fn unresolved_conflicts(&self) -> usize {
        self.conflicts.iter().filter(|c| !c.resolved).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub allocations_count: usize,
    pub conflicts_count: usize,
    pub halls_used: usize,
}

/// 完成的运行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub success: bool,
    pub run_id: String,
    pub allocations: Vec<Allocation>,
    pub conflicts: Vec<SeatConflict>,
    pub summary: RunSummary,
    pub metadata: RunMetadata,
    pub warnings: Vec<RunWarning>,
    pub stages: Vec<EngineStage>,
    pub completed_at: DateTime<Utc>,
}

// ==========================================
// AllocationEngine - 引擎编排器
// ==========================================
pub struct AllocationEngine<S>
where
    S: AllocationStore,
{
    store: Arc<S>,
    config: EngineConfig,
    validator: CapacityValidator,
    grouper: ClassGrouper,
    shuffler: SeededShuffler,
    allocator: RoundRobinAllocator,
    detector: ConflictDetector,
    resolver: ConflictResolver,
    aggregator: MetadataAggregator,
}

impl<S> AllocationEngine<S>
where
    S: AllocationStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: EngineConfig) -> Self {
        Self {
            store,
            resolver: ConflictResolver::new(config.max_resolve_attempts),
            config,
            validator: CapacityValidator::new(),
            grouper: ClassGrouper::new(),
            shuffler: SeededShuffler::new(),
            allocator: RoundRobinAllocator::new(),
            detector: ConflictDetector::new(),
            aggregator: MetadataAggregator::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 计算座位分配（纯计算，不落库）
    ///
    /// # 参数
    /// - run: 运行参数（seed / 编号策略 / 相邻约束强度）
    /// - halls: 考场列表（停用考场会被忽略）
    /// - roster: 考生名单（顺序即输入顺序，参与确定性）
    #[instrument(skip(self, run, halls, roster), fields(
        run_id = %run.run_id,
        exam_id = %run.exam_id,
        halls_count = halls.len(),
        roster_size = roster.len()
    ))]
    pub fn plan(
        &self,
        run: &AllocationRun,
        halls: &[Hall],
        roster: &[Student],
    ) -> Result<AllocationPlan, RunError> {
        let mut stages = Vec::new();

        // ==========================================
        // 步骤1: 容量校验
        // ==========================================
        stages.push(EngineStage::Validating);
        // 考场校验先于名单去重: 无可用考场时直接中止
        let report = self
            .validator
            .validate(halls, roster.len())
            .map_err(|e| self.fail(run, EngineStage::Validating, e))?;
        self.validator
            .validate_roster(roster)
            .map_err(|e| self.fail(run, EngineStage::Validating, e))?;
        debug!(
            active_halls = report.active_halls,
            total_capacity = report.total_capacity,
            spare_seats = report.spare_seats(),
            "容量校验通过"
        );

        let active_halls: Vec<Hall> = halls.iter().filter(|h| h.active).cloned().collect();

        // ==========================================
        // 步骤2: 班级分组
        // ==========================================
        stages.push(EngineStage::Grouping);
        let mut groups = self.grouper.group(roster);
        debug!(groups_count = groups.len(), "班级分组完成");

        // ==========================================
        // 步骤3: 种子洗牌
        // ==========================================
        stages.push(EngineStage::Shuffling);
        let derived_seed = SeededShuffler::derive_seed(&run.seed);
        let mut rng = SeededShuffler::rng_for(&run.seed);
        self.shuffler.shuffle_groups(&mut groups, &mut rng);

        // ==========================================
        // 步骤4: 轮转分配
        // ==========================================
        stages.push(EngineStage::Assigning);
        let mut allocations = self
            .allocator
            .allocate(&run.run_id, &active_halls, &groups, run.seat_numbering)
            .map_err(|e| self.fail(run, EngineStage::Assigning, e))?;

        // ==========================================
        // 步骤5: 冲突检测
        // ==========================================
        stages.push(EngineStage::DetectingConflicts);
        let initial = self.detector.detect(&allocations);
        debug!(initial_conflicts = initial.len(), "冲突检测完成");

        // ==========================================
        // 步骤6: 冲突修复（仅 hard）
        // ==========================================
        let (conflicts, resolve_report) =
            if run.adjacency_strictness == AdjacencyStrictness::Hard && !initial.is_empty() {
                stages.push(EngineStage::Resolving);
                let report = self
                    .resolver
                    .resolve(&mut allocations, initial.clone(), &mut rng);
                let conflicts = Self::merge_conflicts(&initial, &report.remaining);
                (conflicts, Some(report))
            } else {
                (initial, None)
            };

        Ok(AllocationPlan {
            run_id: run.run_id.clone(),
            allocations,
            conflicts,
            resolve_report,
            stages,
            derived_seed,
        })
    }

    /// 执行完整运行: 计算 → 原子落库 → 汇总
    #[instrument(skip(self, run, halls, roster), fields(
        run_id = %run.run_id,
        exam_id = %run.exam_id,
        seat_numbering = %run.seat_numbering,
        adjacency_strictness = %run.adjacency_strictness
    ))]
    pub fn run(
        &self,
        run: &AllocationRun,
        halls: &[Hall],
        roster: &[Student],
    ) -> Result<RunOutcome, RunError> {
        info!(
            halls_count = halls.len(),
            roster_size = roster.len(),
            "开始执行座位编排"
        );

        let plan = self.plan(run, halls, roster)?;
        let AllocationPlan {
            mut allocations,
            conflicts,
            resolve_report,
            mut stages,
            derived_seed,
            ..
        } = plan;

        // ==========================================
        // 步骤7: 原子落库
        // ==========================================
        stages.push(EngineStage::Persisting);
        let completed_at = Utc::now();
        let commit = RunCommit {
            run,
            allocations: &allocations,
            conflicts: &conflicts,
            completed_at,
        };
        let ids = self
            .store
            .commit_run(&commit)
            .map_err(|e| self.fail(run, EngineStage::Persisting, EngineError::Persistence(e)))?;
        for (allocation, id) in allocations.iter_mut().zip(ids) {
            allocation.allocation_id = Some(id);
        }

        // ==========================================
        // 步骤8: 统计汇总
        // ==========================================
        stages.push(EngineStage::Aggregating);
        let resolve_attempts = resolve_report.as_ref().map(|r| r.attempts).unwrap_or(0);
        let metadata = self.aggregator.aggregate(
            &allocations,
            &conflicts,
            run.seat_numbering,
            resolve_attempts,
            derived_seed,
        );

        let mut warnings = Vec::new();
        if let Some(report) = resolve_report.as_ref().filter(|r| !r.is_clean()) {
            warn!(
                remaining = report.remaining.len(),
                attempts = report.attempts,
                "冲突未能全部消除"
            );
            warnings.push(RunWarning::UnresolvedConflicts {
                remaining: report.remaining.len(),
                attempts: report.attempts,
            });
        }

        stages.push(EngineStage::Completed);

        let summary = RunSummary {
            allocations_count: allocations.len(),
            conflicts_count: metadata.unresolved_conflicts,
            halls_used: metadata.halls_used,
        };

        info!(
            allocations_count = summary.allocations_count,
            conflicts_count = summary.conflicts_count,
            halls_used = summary.halls_used,
            "座位编排完成"
        );

        Ok(RunOutcome {
            success: true,
            run_id: run.run_id.clone(),
            allocations,
            conflicts,
            summary,
            metadata,
            warnings,
            stages,
            completed_at,
        })
    }

    /// 初始冲突中已不存在的标记为 resolved，其后追加最终仍存在的冲突
    fn merge_conflicts(initial: &[SeatConflict], remaining: &[SeatConflict]) -> Vec<SeatConflict> {
        let still_open: HashSet<(usize, usize)> = remaining.iter().map(|c| c.pair_key()).collect();

        let mut merged: Vec<SeatConflict> = initial
            .iter()
            .filter(|c| !still_open.contains(&c.pair_key()))
            .cloned()
            .map(SeatConflict::mark_resolved)
            .collect();
        merged.extend(remaining.iter().cloned());
        merged
    }

    fn fail(&self, run: &AllocationRun, stage: EngineStage, source: EngineError) -> RunError {
        let err = RunError::new(run.run_id.clone(), stage, source);
        if err.is_user_correctable() {
            warn!(stage = %stage, error = %err.source, "座位编排被拒绝");
        } else {
            error!(stage = %stage, error = %err.source, "座位编排失败");
        }
        err
    }
}
