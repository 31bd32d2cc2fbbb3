use super::core::{BulkAssignmentExecutor, ItemResult};
use crate::domain::{AssignmentOperation, AssignmentResult, Course};
use crate::engine::error::EngineResult;
use crate::repository::error::RepositoryResult;
use tracing::instrument;

impl BulkAssignmentExecutor {
    // ==========================================
    // ClearAll
    // ==========================================

    /// 清空所有在开课程的教师与教室引用
    ///
    /// # 规则
    /// - 只有实际变更的课程计入 assigned
    /// - 幂等: 重复执行 assigned == 0 且无错误
    /// - 原教师同步移除该课程
    #[instrument(skip(self), fields(scope = scope))]
    pub fn clear_all(&self, scope: &str) -> EngineResult<AssignmentResult> {
        let _guard = self.registry.try_acquire(scope)?;

        let courses = self.port.active_courses()?;
        let mut run = self.begin(AssignmentOperation::ClearAll, courses.len());

        for course in &courses {
            if self.should_stop(&mut run) {
                break;
            }

            match self.commit_clear(course) {
                Ok(ClearOutcome::Unchanged) => {
                    self.record_item(&mut run, course, ItemResult::Unchanged);
                }
                Ok(ClearOutcome::Cleared(Ok(warnings))) => {
                    Self::push_warnings(&mut run, warnings);
                    self.record_item(&mut run, course, ItemResult::Assigned);
                }
                Ok(ClearOutcome::Cleared(Err(e))) => {
                    // 课程已清空, 先计入再中止
                    self.record_item(&mut run, course, ItemResult::Assigned);
                    return Err(self.abort(&mut run, course, e));
                }
                Err(e) => self.absorb_repository_error(&mut run, course, e)?,
            }
        }

        Ok(self.finish(run))
    }

    /// 清空单门课程
    fn commit_clear(&self, course: &Course) -> RepositoryResult<ClearOutcome> {
        let Some(fresh) = self.port.find_course(course.course_id)? else {
            return Ok(ClearOutcome::Unchanged);
        };
        if fresh.teacher_id.is_none() && fresh.room_id.is_none() {
            return Ok(ClearOutcome::Unchanged);
        }

        let mut updated = fresh.clone();
        updated.teacher_id = None;
        updated.room_id = None;
        let saved = self.port.save_course(&updated)?;

        Ok(ClearOutcome::Cleared(self.sync_teacher_ownership(
            &saved,
            fresh.teacher_id,
            None,
        )))
    }
}

/// 单门课程的清空结果
enum ClearOutcome {
    Unchanged,
    /// 课程已落库; 内层为教师集合同步结果 (告警 或 基础设施错误)
    Cleared(RepositoryResult<Vec<String>>),
}
