// ==========================================
// 排课分配引擎 - 推荐引擎
// ==========================================
// 职责: 为缺少合格教师 / 兼容教室的课程给出候选与优先级
// 输入: 课程、教师、教室快照 + 分配参数
// 输出: 按优先级排序的推荐列表 (不落库)
// ==========================================

mod core;
mod rooms;
mod scoring;

#[cfg(test)]
mod tests;

pub use self::core::{RecommendationEngine, TeacherCandidate};
pub(crate) use self::core::CurrentTeacherState;
pub(crate) use rooms::room_occupancy;
pub use rooms::RoomCandidate;
pub(crate) use scoring::room_base_score;
pub use scoring::{
    MAX_SCORE, MIN_SCORE, ROOM_EXACT_TYPE_SCORE, ROOM_GENERAL_CLASSROOM_SCORE,
    ROOM_LAB_REQUIREMENT_SCORE, ROOM_MULTI_USE_SCORE, ROOM_SAME_FAMILY_SCORE,
    ROOM_SPECIALIZED_SCORE,
};
