use super::core::{
    BulkAssignmentExecutor, CommitOutcome, ItemResult, INSUFFICIENT_ROOM_CAPACITY,
    NO_COMPATIBLE_ROOM, STALE_ASSIGNMENT,
};
use crate::domain::{AssignmentOperation, AssignmentResult, Course, RoomAssignmentRecommendation};
use crate::engine::error::EngineResult;
use crate::engine::recommendation::{room_base_score, room_occupancy};
use crate::repository::error::RepositoryResult;
use std::collections::HashMap;
use tracing::instrument;

impl BulkAssignmentExecutor {
    // ==========================================
    // AssignAll - 教室
    // ==========================================

    /// 为所有缺少兼容教室的在开课程分配教室
    ///
    /// 教室占用数在批内实时更新; 与教师分配互相独立
    #[instrument(skip(self), fields(scope = scope))]
    pub fn assign_all_rooms(&self, scope: &str) -> EngineResult<AssignmentResult> {
        let _guard = self.registry.try_acquire(scope)?;

        let rooms = self.port.active_rooms()?;
        let courses = self.port.active_courses()?;
        let mut occupancy = room_occupancy(&courses);

        let targets: Vec<Course> = courses
            .into_iter()
            .filter(|c| self.engine.needs_room(c, &rooms))
            .collect();

        let mut run = self.begin(AssignmentOperation::AssignAllRooms, targets.len());

        for course in &targets {
            if self.should_stop(&mut run) {
                break;
            }

            let pick = self
                .engine
                .rank_room_candidates(course, &rooms, &occupancy)
                .first()
                .map(|c| c.room.room_id);

            let Some(room_id) = pick else {
                self.record_item(&mut run, course, ItemResult::Failed(NO_COMPATIBLE_ROOM));
                continue;
            };

            match self.commit_room(course, course.revision, course.room_id, room_id) {
                Ok(CommitOutcome::Committed { previous, .. }) => {
                    Self::move_occupancy(&mut occupancy, previous, room_id);
                    self.record_item(&mut run, course, ItemResult::Assigned);
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
    // Apply - 教室
    // ==========================================

    /// 提交选中的教室推荐 (提交时复核容量)
    #[instrument(skip(self, recommendations), fields(scope = scope, count = recommendations.len()))]
    pub fn apply_rooms(
        &self,
        scope: &str,
        recommendations: &[RoomAssignmentRecommendation],
    ) -> EngineResult<AssignmentResult> {
        let _guard = self.registry.try_acquire(scope)?;
        let mut run = self.begin(AssignmentOperation::ApplyRooms, recommendations.len());

        for rec in recommendations {
            if self.should_stop(&mut run) {
                break;
            }

            let Some(room) = &rec.recommended_room else {
                self.record_item(&mut run, &rec.course, ItemResult::Failed(NO_COMPATIBLE_ROOM));
                continue;
            };

            let committed = self.commit_room(
                &rec.course,
                rec.course_revision,
                rec.current_room_id,
                room.room_id,
            );
            match committed {
                Ok(CommitOutcome::Committed { .. }) => {
                    self.record_item(&mut run, &rec.course, ItemResult::Assigned);
                }
                Ok(CommitOutcome::Rejected(reason)) => {
                    self.record_item(&mut run, &rec.course, ItemResult::Failed(reason));
                }
                Err(e) => self.absorb_repository_error(&mut run, &rec.course, e)?,
            }
        }

        Ok(self.finish(run))
    }

    /// 复核并提交一条教室分配
    ///
    /// # 规则
    /// - 课程版本 / 当前教室与推荐时不一致 → stale
    /// - 教室停用或类型不再兼容 → stale
    /// - 容量不足当前选课人数 → insufficient room capacity
    fn commit_room(
        &self,
        course: &Course,
        expected_revision: i32,
        expected_room: Option<i64>,
        room_id: i64,
    ) -> RepositoryResult<CommitOutcome> {
        let Some(fresh) = self.port.find_course(course.course_id)? else {
            return Ok(CommitOutcome::Rejected(STALE_ASSIGNMENT));
        };
        if fresh.revision != expected_revision || fresh.room_id != expected_room || !fresh.active {
            return Ok(CommitOutcome::Rejected(STALE_ASSIGNMENT));
        }

        let Some(room) = self.port.find_room(room_id)? else {
            return Ok(CommitOutcome::Rejected(STALE_ASSIGNMENT));
        };
        if !room.active {
            return Ok(CommitOutcome::Rejected(STALE_ASSIGNMENT));
        }
        if room.capacity < fresh.current_enrollment {
            return Ok(CommitOutcome::Rejected(INSUFFICIENT_ROOM_CAPACITY));
        }
        if room_base_score(&fresh, &room).is_none() {
            return Ok(CommitOutcome::Rejected(STALE_ASSIGNMENT));
        }

        let mut updated = fresh.clone();
        updated.room_id = Some(room_id);
        self.port.save_course(&updated)?;

        tracing::debug!(
            course_id = course.course_id,
            room_id = room_id,
            previous = ?fresh.room_id,
            "教室分配已提交"
        );
        Ok(CommitOutcome::Committed {
            previous: fresh.room_id,
            warnings: Vec::new(),
            sync_error: None,
        })
    }

    fn move_occupancy(occupancy: &mut HashMap<i64, usize>, previous: Option<i64>, next: i64) {
        if let Some(prev) = previous {
            if let Some(count) = occupancy.get_mut(&prev) {
                *count = count.saturating_sub(1);
            }
        }
        *occupancy.entry(next).or_insert(0) += 1;
    }
}
