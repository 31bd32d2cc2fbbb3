use super::core::RecommendationEngine;
use super::scoring::{priority_for, room_base_score, room_score};
use crate::domain::{Course, Room, RoomAssignmentRecommendation};
use std::collections::HashMap;
use tracing::instrument;

// ==========================================
// RoomCandidate - 单个教室候选
// ==========================================
#[derive(Debug, Clone)]
pub struct RoomCandidate<'a> {
    pub room: &'a Room,
    pub hosted_courses: usize,
    pub score: i32,
}

/// 课程当前教室的状况
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CurrentRoomState {
    Missing,
    NotFound,
    Inactive,
    Incompatible,
    Compatible,
}

/// 每个教室承载的在开课程数
pub(crate) fn room_occupancy(courses: &[Course]) -> HashMap<i64, usize> {
    let mut occupancy = HashMap::new();
    for room_id in courses.iter().filter(|c| c.active).filter_map(|c| c.room_id) {
        *occupancy.entry(room_id).or_insert(0) += 1;
    }
    occupancy
}

impl RecommendationEngine {
    // ==========================================
    // 教室推荐
    // ==========================================

    /// 为缺少兼容教室的在开课程生成推荐
    ///
    /// 兼容: 容量 ≥ 当前选课人数, 且类型满足 required_room_type / requires_lab
    #[instrument(skip(self, courses, rooms), fields(courses = courses.len(), rooms = rooms.len()))]
    pub fn recommend_rooms(
        &self,
        courses: &[Course],
        rooms: &[Room],
    ) -> Vec<RoomAssignmentRecommendation> {
        let by_id: HashMap<i64, &Room> = rooms.iter().map(|r| (r.room_id, r)).collect();
        let occupancy = room_occupancy(courses);

        let mut recommendations: Vec<RoomAssignmentRecommendation> = courses
            .iter()
            .filter(|c| c.active)
            .filter_map(|course| {
                let state = Self::current_room_state(course, &by_id);
                if state == CurrentRoomState::Compatible {
                    return None;
                }
                Some(self.build_room_recommendation(course, rooms, &occupancy, state))
            })
            .collect();

        recommendations.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.course.course_id.cmp(&b.course.course_id))
        });

        tracing::debug!(recommendations = recommendations.len(), "教室推荐生成完成");
        recommendations
    }

    /// 课程是否需要 (重新) 分配教室
    pub fn needs_room(&self, course: &Course, rooms: &[Room]) -> bool {
        let by_id: HashMap<i64, &Room> = rooms.iter().map(|r| (r.room_id, r)).collect();
        course.active && Self::current_room_state(course, &by_id) != CurrentRoomState::Compatible
    }

    fn current_room_state(course: &Course, by_id: &HashMap<i64, &Room>) -> CurrentRoomState {
        let Some(room_id) = course.room_id else {
            return CurrentRoomState::Missing;
        };
        match by_id.get(&room_id) {
            None => CurrentRoomState::NotFound,
            Some(r) if !r.active => CurrentRoomState::Inactive,
            Some(r) if room_base_score(course, r).is_none() => CurrentRoomState::Incompatible,
            Some(_) => CurrentRoomState::Compatible,
        }
    }

    fn build_room_recommendation(
        &self,
        course: &Course,
        rooms: &[Room],
        occupancy: &HashMap<i64, usize>,
        state: CurrentRoomState,
    ) -> RoomAssignmentRecommendation {
        let candidates = self.rank_room_candidates(course, rooms, occupancy);
        let best = candidates.first();

        let situation = match state {
            CurrentRoomState::Missing => "course has no room".to_string(),
            CurrentRoomState::NotFound => format!(
                "current room {} not found",
                course.room_id.unwrap_or_default()
            ),
            CurrentRoomState::Inactive => "current room is inactive".to_string(),
            CurrentRoomState::Incompatible => "current room is incompatible".to_string(),
            CurrentRoomState::Compatible => "current room is compatible".to_string(),
        };

        let reasoning = match best {
            Some(c) => format!(
                "{}; recommend room {} ({}, capacity {}), hosting {} courses, score {}",
                situation,
                c.room.room_number,
                c.room.room_type,
                c.room.capacity,
                c.hosted_courses,
                c.score
            ),
            None => format!("{}; no compatible room", situation),
        };

        RoomAssignmentRecommendation {
            course: course.clone(),
            current_room_id: course.room_id,
            recommended_room: best.map(|c| c.room.clone()),
            match_score: best.map(|c| c.score).unwrap_or(0),
            priority: priority_for(
                course.core_required,
                best.map(|c| c.score),
                state == CurrentRoomState::Incompatible,
                self.config(),
            ),
            reasoning,
            course_revision: course.revision,
        }
    }

    /// 课程的全部兼容教室候选 (已排序)
    ///
    /// 排序: 分数降序 → 已承载课程数升序 → room_id 升序
    pub fn rank_room_candidates<'a>(
        &self,
        course: &Course,
        rooms: &'a [Room],
        occupancy: &HashMap<i64, usize>,
    ) -> Vec<RoomCandidate<'a>> {
        let mut candidates: Vec<RoomCandidate<'a>> = rooms
            .iter()
            .filter(|r| r.active)
            .filter_map(|room| {
                let mut hosted = occupancy.get(&room.room_id).copied().unwrap_or(0);
                // 不把课程自身计入占用
                if course.room_id == Some(room.room_id) {
                    hosted = hosted.saturating_sub(1);
                }
                let score = room_score(course, room, hosted, self.config())?;
                Some(RoomCandidate {
                    room,
                    hosted_courses: hosted,
                    score,
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.hosted_courses.cmp(&b.hosted_courses))
                .then_with(|| a.room.room_id.cmp(&b.room.room_id))
        });
        candidates
    }
}
