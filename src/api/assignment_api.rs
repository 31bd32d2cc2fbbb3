// ==========================================
// 排课分配引擎 - 分配 API
// ==========================================
// 职责: 推荐/审计查询 + 批量分配入口, 供界面层调用
// 说明: 每次调用重新读取快照; 批量任务共享同一把 scope 锁
// ==========================================

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::JoinHandle;

use crate::api::error::{ApiError, ApiResult};
use crate::config::{AssignmentConfig, AssignmentConfigReader};
use crate::domain::types::{QualificationTier, WorkloadLevel};
use crate::domain::{
    AssignmentResult, AssignmentValidation, ComplianceViolation, CourseAssignmentRecommendation,
    ExpiringCertificationNotice, RoomAssignmentRecommendation,
};
use crate::engine::{
    AssignmentJobRegistry, AssignmentProgress, AssignmentStatusDeriver, BulkAssignmentExecutor,
    CancellationFlag, ChannelProgressSink, ComplianceAuditor, EngineError, QualificationResolver,
    RecommendationEngine, TeacherCandidate,
};
use crate::repository::school_port::SchoolDataPort;

/// 当前日期 (本地时区)
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ==========================================
// 视图对象
// ==========================================

/// 教师候选信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherCandidateInfo {
    pub teacher_id: i64,
    pub name: String,
    pub tier: QualificationTier,
    pub workload: WorkloadLevel,
    pub course_count: usize,
    pub expiring: bool,
    pub score: i32,
}

impl From<&TeacherCandidate<'_>> for TeacherCandidateInfo {
    fn from(c: &TeacherCandidate<'_>) -> Self {
        Self {
            teacher_id: c.teacher.teacher_id,
            name: c.teacher.name.clone(),
            tier: c.tier,
            workload: c.workload,
            course_count: c.teacher.course_count(),
            expiring: c.expiring,
            score: c.score,
        }
    }
}

/// 分配状态统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentStatusSummary {
    pub unassigned: usize,
    pub partial: usize,
    pub assigned: usize,
}

/// 后台批量任务句柄
pub struct AssignmentJobHandle {
    pub job: JoinHandle<ApiResult<AssignmentResult>>,
    pub progress: UnboundedReceiver<AssignmentProgress>,
    pub cancel: CancellationFlag,
}

impl AssignmentJobHandle {
    /// 请求取消 (课程之间生效)
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// 等待任务结束
    pub async fn wait(self) -> ApiResult<AssignmentResult> {
        match self.job.await {
            Ok(result) => result,
            Err(e) => Err(EngineError::Join(e.to_string()).into()),
        }
    }
}

// ==========================================
// AssignmentApi - 分配 API
// ==========================================
pub struct AssignmentApi {
    port: Arc<dyn SchoolDataPort>,
    config: AssignmentConfig,
    registry: AssignmentJobRegistry,
}

impl AssignmentApi {
    pub fn new(port: Arc<dyn SchoolDataPort>, config: AssignmentConfig) -> Self {
        Self {
            port,
            config,
            registry: AssignmentJobRegistry::new(),
        }
    }

    /// 从配置读取器加载参数后创建
    pub async fn from_config_reader(
        port: Arc<dyn SchoolDataPort>,
        reader: &dyn AssignmentConfigReader,
    ) -> ApiResult<Self> {
        let config = AssignmentConfig::load(reader)
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        Ok(Self::new(port, config))
    }

    pub fn config(&self) -> &AssignmentConfig {
        &self.config
    }

    fn executor(&self) -> BulkAssignmentExecutor {
        BulkAssignmentExecutor::new(self.port.clone(), self.config.clone())
            .with_registry(self.registry.clone())
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 教师推荐 (按优先级排序)
    pub fn recommend_teachers(&self, today: NaiveDate) -> ApiResult<Vec<CourseAssignmentRecommendation>> {
        let teachers = self.port.active_teachers()?;
        let courses = self.port.active_courses()?;
        Ok(RecommendationEngine::new(self.config.clone()).recommend_teachers(&courses, &teachers, today))
    }

    /// 教室推荐 (按优先级排序)
    pub fn recommend_rooms(&self) -> ApiResult<Vec<RoomAssignmentRecommendation>> {
        let rooms = self.port.active_rooms()?;
        let courses = self.port.active_courses()?;
        Ok(RecommendationEngine::new(self.config.clone()).recommend_rooms(&courses, &rooms))
    }

    /// 某门课程的全部教师候选
    pub fn teacher_candidates(
        &self,
        course_id: i64,
        today: NaiveDate,
    ) -> ApiResult<Vec<TeacherCandidateInfo>> {
        let course = self
            .port
            .find_course(course_id)?
            .ok_or_else(|| ApiError::NotFound(format!("course(id={})不存在", course_id)))?;
        let teachers = self.port.active_teachers()?;

        let engine = RecommendationEngine::new(self.config.clone());
        let candidates = engine.rank_teacher_candidates(&course, &teachers, today);
        Ok(candidates.iter().map(TeacherCandidateInfo::from).collect())
    }

    /// 合规审计
    pub fn audit(&self, today: NaiveDate) -> ApiResult<Vec<ComplianceViolation>> {
        let teachers = self.port.active_teachers()?;
        let courses = self.port.active_courses()?;
        Ok(ComplianceAuditor::new(self.config.clone()).audit(&courses, &teachers, today))
    }

    /// 即将到期的证书
    pub fn expiring_certifications(&self, today: NaiveDate) -> ApiResult<Vec<ExpiringCertificationNotice>> {
        let teachers = self.port.active_teachers()?;
        Ok(ComplianceAuditor::new(self.config.clone()).expiring_certifications(&teachers, today))
    }

    /// 在开课程的分配状态统计
    pub fn status_summary(&self) -> ApiResult<AssignmentStatusSummary> {
        let courses = self.port.active_courses()?;
        let (unassigned, partial, assigned) = AssignmentStatusDeriver::summarize(&courses);
        Ok(AssignmentStatusSummary {
            unassigned,
            partial,
            assigned,
        })
    }

    /// 校验单条人工分配
    pub fn validate_assignment(
        &self,
        teacher_id: i64,
        course_id: i64,
        today: NaiveDate,
    ) -> ApiResult<AssignmentValidation> {
        let teacher = self
            .port
            .find_teacher(teacher_id)?
            .ok_or_else(|| ApiError::NotFound(format!("teacher(id={})不存在", teacher_id)))?;
        let course = self
            .port
            .find_course(course_id)?
            .ok_or_else(|| ApiError::NotFound(format!("course(id={})不存在", course_id)))?;
        Ok(QualificationResolver::validate_assignment(
            &teacher,
            &course,
            today,
            self.config.hours_warning_ratio,
        ))
    }

    // ==========================================
    // 批量操作
    // ==========================================

    pub fn assign_all(&self, scope: &str, today: NaiveDate) -> ApiResult<AssignmentResult> {
        Self::check_scope(scope)?;
        Ok(self.executor().assign_all(scope, today)?)
    }

    pub fn assign_all_rooms(&self, scope: &str) -> ApiResult<AssignmentResult> {
        Self::check_scope(scope)?;
        Ok(self.executor().assign_all_rooms(scope)?)
    }

    pub fn apply(
        &self,
        scope: &str,
        recommendations: &[CourseAssignmentRecommendation],
        today: NaiveDate,
    ) -> ApiResult<AssignmentResult> {
        Self::check_scope(scope)?;
        Ok(self.executor().apply(scope, recommendations, today)?)
    }

    pub fn apply_rooms(
        &self,
        scope: &str,
        recommendations: &[RoomAssignmentRecommendation],
    ) -> ApiResult<AssignmentResult> {
        Self::check_scope(scope)?;
        Ok(self.executor().apply_rooms(scope, recommendations)?)
    }

    /// 审计后提交全部可用的纠正建议
    pub fn apply_corrections(&self, scope: &str, today: NaiveDate) -> ApiResult<AssignmentResult> {
        let violations = self.audit(today)?;
        let corrections = ComplianceAuditor::corrections(&violations);
        self.apply(scope, &corrections, today)
    }

    pub fn clear_all(&self, scope: &str) -> ApiResult<AssignmentResult> {
        Self::check_scope(scope)?;
        Ok(self.executor().clear_all(scope)?)
    }

    pub fn preview_assign_all(&self, today: NaiveDate) -> ApiResult<AssignmentResult> {
        Ok(self.executor().preview_assign_all(today)?)
    }

    /// 在后台线程运行 AssignAll
    ///
    /// scope 锁在返回前占用, 重复提交立即失败; 需在 tokio 运行时内调用
    pub fn spawn_assign_all(&self, scope: &str, today: NaiveDate) -> ApiResult<AssignmentJobHandle> {
        Self::check_scope(scope)?;
        let guard = self.registry.try_acquire(scope)?;

        let (tx, rx) = unbounded_channel();
        let cancel = CancellationFlag::new();
        let executor = self
            .executor()
            .with_progress_sink(Arc::new(ChannelProgressSink::new(tx)))
            .with_cancellation(cancel.clone());

        let job = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            executor.run_assign_all(today).map_err(ApiError::from)
        });

        Ok(AssignmentJobHandle {
            job,
            progress: rx,
            cancel,
        })
    }

    fn check_scope(scope: &str) -> ApiResult<()> {
        if scope.trim().is_empty() {
            return Err(ApiError::InvalidInput("scope不能为空".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Course, SubjectCertification, Teacher};
    use crate::repository::memory_repo::InMemorySchoolRepository;

    fn api_with(teachers: Vec<Teacher>, courses: Vec<Course>) -> AssignmentApi {
        let repo = InMemorySchoolRepository::with_data(teachers, courses, vec![]);
        AssignmentApi::new(Arc::new(repo), AssignmentConfig::default())
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
    }

    fn teacher(id: i64) -> Teacher {
        let mut t = Teacher::new(id, &format!("T{}", id));
        t.subject_certifications.push(SubjectCertification::new("Physics"));
        t
    }

    #[test]
    fn test_empty_scope_rejected() {
        let api = api_with(vec![], vec![]);
        assert!(matches!(api.clear_all("  "), Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn test_candidates_for_missing_course() {
        let api = api_with(vec![teacher(1)], vec![]);
        assert!(matches!(api.teacher_candidates(9, day()), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_status_summary_after_assign_all() {
        let api = api_with(vec![teacher(1)], vec![Course::new(1, "PHY-1", "Physics")]);
        let before = api.status_summary().unwrap();
        assert_eq!(before.unassigned, 1);

        api.assign_all("district-1", day()).unwrap();
        let after = api.status_summary().unwrap();
        assert_eq!(after.partial, 1);
    }

    #[tokio::test]
    async fn test_spawned_job_holds_scope_lock() {
        let api = api_with(vec![teacher(1)], vec![Course::new(1, "PHY-1", "Physics")]);

        let handle = api.spawn_assign_all("district-1", day()).unwrap();
        let second = api.assign_all("district-1", day());
        // 任务可能已结束; 若仍在运行则必须被拒绝
        if let Err(e) = second {
            assert!(matches!(e, ApiError::JobAlreadyRunning { .. }));
        }

        let result = handle.wait().await.unwrap();
        assert_eq!(result.total_processed, 1);
    }
}
