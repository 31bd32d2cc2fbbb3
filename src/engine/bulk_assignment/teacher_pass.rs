use super::core::{
    apply_to_working_set, BatchRun, BulkAssignmentExecutor, CommitOutcome, ItemResult,
    NO_QUALIFIED_TEACHER, STALE_ASSIGNMENT,
};
use crate::domain::types::WorkloadLevel;
use crate::domain::{AssignmentOperation, AssignmentResult, Course, CourseAssignmentRecommendation};
use crate::engine::error::EngineResult;
use crate::engine::qualification::QualificationResolver;
use crate::repository::error::RepositoryResult;
use chrono::NaiveDate;
use tracing::instrument;

impl BulkAssignmentExecutor {
    // ==========================================
    // AssignAll - 教师
    // ==========================================

    /// 为所有缺少合格教师的在开课程分配教师
    ///
    /// # 规则
    /// - 候选按推荐引擎排序, 工作量在批内实时更新
    /// - 已 Overloaded 的教师不再分配新课程
    /// - 无候选 → "no qualified teacher"
    #[instrument(skip(self), fields(scope = scope))]
    pub fn assign_all(&self, scope: &str, today: NaiveDate) -> EngineResult<AssignmentResult> {
        let _guard = self.registry.try_acquire(scope)?;
        self.run_assign_all(today)
    }

    pub(crate) fn run_assign_all(&self, today: NaiveDate) -> EngineResult<AssignmentResult> {
        let mut teachers = self.port.active_teachers()?;
        let courses = self.port.active_courses()?;

        let targets: Vec<Course> = courses
            .into_iter()
            .filter(|c| self.engine.needs_teacher(c, &teachers, today))
            .collect();

        let mut run = self.begin(AssignmentOperation::AssignAllTeachers, targets.len());

        for course in &targets {
            if self.should_stop(&mut run) {
                break;
            }

            let pick = self
                .engine
                .rank_teacher_candidates(course, &teachers, today)
                .into_iter()
                .find(|c| c.workload != WorkloadLevel::Overloaded)
                .map(|c| c.teacher.teacher_id);

            let Some(teacher_id) = pick else {
                self.record_item(&mut run, course, ItemResult::Failed(NO_QUALIFIED_TEACHER));
                continue;
            };

            let committed =
                self.commit_teacher(course, course.revision, course.teacher_id, teacher_id, today);
            match committed {
                Ok(CommitOutcome::Committed {
                    previous,
                    warnings,
                    sync_error,
                }) => {
                    apply_to_working_set(&mut teachers, course.course_id, previous, teacher_id);
                    Self::push_warnings(&mut run, warnings);
                    self.record_item(&mut run, course, ItemResult::Assigned);
                    if let Some(e) = sync_error {
                        return Err(self.abort(&mut run, course, e));
                    }
                }
                Ok(CommitOutcome::Rejected(reason)) => {
                    self.record_item(&mut run, course, ItemResult::Failed(reason));
                }
                Err(e) => self.absorb_repository_error(&mut run, course, e)?,
            }
        }

        Ok(self.finish(run))
    }

    // ==========================================
    // Apply - 教师
    // ==========================================

    /// 提交选中的教师推荐
    ///
    /// 每条在提交时复核: 课程版本、当前教师、推荐人资格
    #[instrument(skip(self, recommendations), fields(scope = scope, count = recommendations.len()))]
    pub fn apply(
        &self,
        scope: &str,
        recommendations: &[CourseAssignmentRecommendation],
        today: NaiveDate,
    ) -> EngineResult<AssignmentResult> {
        let _guard = self.registry.try_acquire(scope)?;
        let mut run = self.begin(AssignmentOperation::ApplyTeachers, recommendations.len());

        for rec in recommendations {
            if self.should_stop(&mut run) {
                break;
            }

            let Some(teacher) = &rec.recommended_teacher else {
                self.record_item(&mut run, &rec.course, ItemResult::Failed(NO_QUALIFIED_TEACHER));
                continue;
            };

            match self.commit_teacher(
                &rec.course,
                rec.course_revision,
                rec.current_teacher_id,
                teacher.teacher_id,
                today,
            ) {
                Ok(CommitOutcome::Committed {
                    warnings,
                    sync_error,
                    ..
                }) => {
                    Self::push_warnings(&mut run, warnings);
                    self.record_item(&mut run, &rec.course, ItemResult::Assigned);
                    if let Some(e) = sync_error {
                        return Err(self.abort(&mut run, &rec.course, e));
                    }
                }
                Ok(CommitOutcome::Rejected(reason)) => {
                    self.record_item(&mut run, &rec.course, ItemResult::Failed(reason));
                }
                Err(e) => self.absorb_repository_error(&mut run, &rec.course, e)?,
            }
        }

        Ok(self.finish(run))
    }

    // ==========================================
    // 提交 (单条)
    // ==========================================

    /// 复核并提交一条教师分配
    ///
    /// # 参数
    /// - expected_revision / expected_teacher: 生成推荐时看到的课程状态
    fn commit_teacher(
        &self,
        course: &Course,
        expected_revision: i32,
        expected_teacher: Option<i64>,
        teacher_id: i64,
        today: NaiveDate,
    ) -> RepositoryResult<CommitOutcome> {
        let Some(fresh) = self.port.find_course(course.course_id)? else {
            return Ok(CommitOutcome::Rejected(STALE_ASSIGNMENT));
        };
        if fresh.revision != expected_revision
            || fresh.teacher_id != expected_teacher
            || !fresh.active
        {
            tracing::debug!(
                course_id = course.course_id,
                expected_revision = expected_revision,
                actual_revision = fresh.revision,
                "课程已变更, 拒绝提交"
            );
            return Ok(CommitOutcome::Rejected(STALE_ASSIGNMENT));
        }

        let Some(teacher) = self.port.find_teacher(teacher_id)? else {
            return Ok(CommitOutcome::Rejected(STALE_ASSIGNMENT));
        };
        if !teacher.active || !QualificationResolver::is_qualified(&teacher, &fresh, today) {
            return Ok(CommitOutcome::Rejected(STALE_ASSIGNMENT));
        }

        let validation = QualificationResolver::validate_assignment(
            &teacher,
            &fresh,
            today,
            self.config().hours_warning_ratio,
        );

        let mut updated = fresh.clone();
        updated.teacher_id = Some(teacher_id);
        let saved = self.port.save_course(&updated)?;

        let mut warnings: Vec<String> = validation
            .issues
            .into_iter()
            .chain(validation.warnings)
            .map(|w| format!("course {}: {}", course.course_code, w))
            .collect();
        let sync = self.sync_teacher_ownership(&saved, fresh.teacher_id, Some(teacher_id));
        let sync_error = match sync {
            Ok(sync_warnings) => {
                warnings.extend(sync_warnings);
                None
            }
            Err(e) => Some(e),
        };

        tracing::debug!(
            course_id = course.course_id,
            teacher_id = teacher_id,
            previous = ?fresh.teacher_id,
            "教师分配已提交"
        );
        Ok(CommitOutcome::Committed {
            previous: fresh.teacher_id,
            warnings,
            sync_error,
        })
    }

    pub(crate) fn push_warnings(run: &mut BatchRun, warnings: Vec<String>) {
        for warning in warnings {
            run.result.add_warning(warning);
        }
    }
}
