use super::core::BulkAssignmentExecutor;
use crate::domain::AssignmentResult;
use crate::engine::error::EngineResult;
use crate::repository::memory_repo::InMemorySchoolRepository;
use chrono::NaiveDate;
use std::sync::Arc;

impl BulkAssignmentExecutor {
    /// 预演 AssignAll: 在内存快照上执行, 不写入真实数据
    ///
    /// 不占用 scope 锁, 也不上报进度
    pub fn preview_assign_all(&self, today: NaiveDate) -> EngineResult<AssignmentResult> {
        let snapshot = InMemorySchoolRepository::with_data(
            self.port.active_teachers()?,
            self.port.active_courses()?,
            self.port.active_rooms()?,
        );

        let simulator = BulkAssignmentExecutor::new(Arc::new(snapshot), self.config().clone())
            .with_cancellation(self.cancellation_flag());
        let mut result = simulator.run_assign_all(today)?;
        result.is_simulation = true;

        tracing::info!(
            job_id = %result.job_id,
            assigned = result.assigned,
            failed = result.failed,
            "预演完成"
        );
        Ok(result)
    }
}
