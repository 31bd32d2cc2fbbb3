use crate::config::AssignmentConfig;
use crate::domain::{AssignmentOperation, AssignmentResult, Course, Teacher};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::events::{
    AssignmentProgress, AssignmentProgressSink, ItemOutcome, OptionalProgressSink,
};
use crate::engine::job_control::{AssignmentJobRegistry, CancellationFlag};
use crate::engine::recommendation::RecommendationEngine;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::school_port::SchoolDataPort;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

// ===== 单条失败原因 =====
pub const NO_QUALIFIED_TEACHER: &str = "no qualified teacher";
pub const NO_COMPATIBLE_ROOM: &str = "no compatible room";
pub const STALE_ASSIGNMENT: &str = "stale: assignment changed";
pub const INSUFFICIENT_ROOM_CAPACITY: &str = "insufficient room capacity";

/// 单条课程的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ItemResult {
    Assigned,
    Unchanged,
    Failed(&'static str),
}

/// 提交阶段的结果
#[derive(Debug)]
pub(crate) enum CommitOutcome {
    /// 已提交; previous 为被替换的旧引用
    ///
    /// sync_error: 课程已落库, 但教师集合同步遇到基础设施错误.
    /// 调用方先记该条成功, 再中止整批
    Committed {
        previous: Option<i64>,
        warnings: Vec<String>,
        sync_error: Option<RepositoryError>,
    },
    /// 提交时复核失败
    Rejected(&'static str),
}

/// 一次批量运行的上下文
pub(crate) struct BatchRun {
    pub(crate) result: AssignmentResult,
    pub(crate) started: Instant,
    pub(crate) total: usize,
}

// ==========================================
// BulkAssignmentExecutor - 批量分配执行器
// ==========================================
pub struct BulkAssignmentExecutor {
    pub(crate) port: Arc<dyn SchoolDataPort>,
    pub(crate) engine: RecommendationEngine,
    pub(crate) registry: AssignmentJobRegistry,
    pub(crate) progress: OptionalProgressSink,
    pub(crate) cancel: CancellationFlag,
}

impl BulkAssignmentExecutor {
    pub fn new(port: Arc<dyn SchoolDataPort>, config: AssignmentConfig) -> Self {
        Self {
            port,
            engine: RecommendationEngine::new(config),
            registry: AssignmentJobRegistry::new(),
            progress: OptionalProgressSink::none(),
            cancel: CancellationFlag::new(),
        }
    }

    /// 共享任务锁 (多个执行器实例间互斥)
    pub fn with_registry(mut self, registry: AssignmentJobRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_progress_sink(mut self, sink: Arc<dyn AssignmentProgressSink>) -> Self {
        self.progress = OptionalProgressSink::with_sink(sink);
        self
    }

    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancel = flag;
        self
    }

    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    pub fn registry(&self) -> &AssignmentJobRegistry {
        &self.registry
    }

    pub fn config(&self) -> &AssignmentConfig {
        self.engine.config()
    }

    // ==========================================
    // 批量运行骨架
    // ==========================================

    pub(crate) fn begin(&self, operation: AssignmentOperation, total: usize) -> BatchRun {
        let job_id = Uuid::new_v4().to_string();
        tracing::info!(
            job_id = %job_id,
            operation = operation.as_str(),
            total = total,
            "批量任务开始"
        );
        self.progress.report(AssignmentProgress::Started {
            job_id: job_id.clone(),
            operation,
            total,
        });
        BatchRun {
            result: AssignmentResult::new(&job_id, operation),
            started: Instant::now(),
            total,
        }
    }

    /// 课程之间检查取消信号
    pub(crate) fn should_stop(&self, run: &mut BatchRun) -> bool {
        if self.cancel.is_cancelled() {
            if !run.result.cancelled {
                tracing::warn!(
                    job_id = %run.result.job_id,
                    processed = run.result.total_processed,
                    "批量任务已取消, 保留已提交条目"
                );
            }
            run.result.cancelled = true;
            return true;
        }
        false
    }

    pub(crate) fn record_item(&self, run: &mut BatchRun, course: &Course, item: ItemResult) {
        let (outcome, message) = match item {
            ItemResult::Assigned => {
                run.result.record_success();
                (ItemOutcome::Assigned, None)
            }
            ItemResult::Unchanged => {
                run.result.record_unchanged();
                (ItemOutcome::Unchanged, None)
            }
            ItemResult::Failed(reason) => {
                let message = format!("course {}: {}", course.course_code, reason);
                tracing::debug!(course_id = course.course_id, reason = reason, "课程处理失败");
                run.result.record_failure(message.clone());
                (ItemOutcome::Failed, Some(message))
            }
        };

        self.progress.report(AssignmentProgress::ItemProcessed {
            job_id: run.result.job_id.clone(),
            course_id: course.course_id,
            processed: run.result.total_processed,
            total: run.total,
            outcome,
            message,
        });
    }

    /// 处理提交阶段的仓储错误
    ///
    /// # 规则
    /// - 乐观锁冲突 / 记录消失 → 该条记为 stale 失败, 继续
    /// - 其他错误 → 中止整批, 返回部分结果
    pub(crate) fn absorb_repository_error(
        &self,
        run: &mut BatchRun,
        course: &Course,
        err: RepositoryError,
    ) -> EngineResult<()> {
        if err.is_item_level() {
            tracing::warn!(course_id = course.course_id, error = %err, "提交冲突, 记为过期");
            self.record_item(run, course, ItemResult::Failed(STALE_ASSIGNMENT));
            return Ok(());
        }
        Err(self.abort(run, course, err))
    }

    /// 中止整批: 收尾部分结果并上报
    ///
    /// 不记录当前条目; 调用方按该条是否已提交自行记录
    pub(crate) fn abort(
        &self,
        run: &mut BatchRun,
        course: &Course,
        err: RepositoryError,
    ) -> EngineError {
        tracing::error!(
            job_id = %run.result.job_id,
            course_id = course.course_id,
            error = %err,
            "基础设施错误, 中止批量任务"
        );
        run.result
            .errors
            .push(format!("course {}: {}", course.course_code, err));
        run.result.finish(run.started);
        self.progress.report(AssignmentProgress::Aborted {
            job_id: run.result.job_id.clone(),
            error: err.to_string(),
        });
        EngineError::BatchAborted {
            source: err,
            partial: Box::new(run.result.clone()),
        }
    }

    pub(crate) fn finish(&self, mut run: BatchRun) -> AssignmentResult {
        run.result.finish(run.started);
        tracing::info!(
            job_id = %run.result.job_id,
            operation = run.result.operation.as_str(),
            processed = run.result.total_processed,
            assigned = run.result.assigned,
            failed = run.result.failed,
            cancelled = run.result.cancelled,
            duration_ms = run.result.duration_ms,
            "批量任务结束"
        );
        self.progress.report(AssignmentProgress::Finished {
            job_id: run.result.job_id.clone(),
            assigned: run.result.assigned,
            failed: run.result.failed,
            cancelled: run.result.cancelled,
        });
        run.result
    }

    // ==========================================
    // 教师 course_ids 同步
    // ==========================================

    /// 修改教师拥有的课程集合并保存
    ///
    /// 乐观锁冲突时重新读取并重放一次; 教师不存在时跳过
    pub(crate) fn update_teacher_courses<F>(
        &self,
        teacher_id: i64,
        mutate: F,
    ) -> RepositoryResult<Option<Teacher>>
    where
        F: Fn(&mut BTreeSet<i64>) -> bool,
    {
        let mut retried = false;
        loop {
            let Some(mut teacher) = self.port.find_teacher(teacher_id)? else {
                return Ok(None);
            };
            if !mutate(&mut teacher.course_ids) {
                return Ok(Some(teacher));
            }
            match self.port.save_teacher(&teacher) {
                Ok(saved) => return Ok(Some(saved)),
                Err(RepositoryError::OptimisticLockFailure { .. }) if !retried => {
                    tracing::debug!(teacher_id = teacher_id, "教师版本冲突, 重新读取后重试");
                    retried = true;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// 课程引用变更后的双向同步
    ///
    /// 同步失败 (单条级) 只产生告警, 课程变更已提交
    pub(crate) fn sync_teacher_ownership(
        &self,
        course: &Course,
        previous: Option<i64>,
        next: Option<i64>,
    ) -> RepositoryResult<Vec<String>> {
        let mut warnings = Vec::new();
        let course_id = course.course_id;

        if let Some(next_id) = next {
            if let Err(e) = self.update_teacher_courses(next_id, |set| set.insert(course_id)) {
                if !e.is_item_level() {
                    return Err(e);
                }
                warnings.push(format!(
                    "course {}: course list of teacher {} not updated ({})",
                    course.course_code, next_id, e
                ));
            }
        }

        if let Some(prev_id) = previous.filter(|p| Some(*p) != next) {
            if let Err(e) = self.update_teacher_courses(prev_id, |set| set.remove(&course_id)) {
                if !e.is_item_level() {
                    return Err(e);
                }
                warnings.push(format!(
                    "course {}: course list of teacher {} not updated ({})",
                    course.course_code, prev_id, e
                ));
            }
        }

        Ok(warnings)
    }
}

/// 维护批量任务内的实时工作量快照
pub(crate) fn apply_to_working_set(
    teachers: &mut [Teacher],
    course_id: i64,
    previous: Option<i64>,
    next: i64,
) {
    for teacher in teachers.iter_mut() {
        if teacher.teacher_id == next {
            teacher.course_ids.insert(course_id);
        } else if Some(teacher.teacher_id) == previous {
            teacher.course_ids.remove(&course_id);
        }
    }
}
