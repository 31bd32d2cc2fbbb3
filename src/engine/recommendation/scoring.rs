use crate::config::AssignmentConfig;
use crate::domain::types::{QualificationTier, RecommendationPriority, RoomType, WorkloadLevel};
use crate::domain::{Course, Room};

/// 分数上下限
pub const MAX_SCORE: i32 = 100;
pub const MIN_SCORE: i32 = 0;

// ===== 教室类型基础分 =====
pub const ROOM_EXACT_TYPE_SCORE: i32 = 100;
pub const ROOM_LAB_REQUIREMENT_SCORE: i32 = 90;
pub const ROOM_GENERAL_CLASSROOM_SCORE: i32 = 80;
pub const ROOM_SAME_FAMILY_SCORE: i32 = 70;
pub const ROOM_MULTI_USE_SCORE: i32 = 60;
pub const ROOM_SPECIALIZED_SCORE: i32 = 40;

/// 工作量扣分
pub(crate) fn workload_penalty(level: WorkloadLevel, config: &AssignmentConfig) -> i32 {
    match level {
        WorkloadLevel::Underutilized => 0,
        WorkloadLevel::Light => config.light_load_penalty,
        WorkloadLevel::Normal => config.normal_load_penalty,
        WorkloadLevel::Overloaded => config.overloaded_penalty,
    }
}

/// 教师候选分 = 层级基础分 - 工作量扣分 - 证书到期扣分
pub(crate) fn teacher_score(
    tier: QualificationTier,
    level: WorkloadLevel,
    expiring: bool,
    config: &AssignmentConfig,
) -> i32 {
    let expiring_penalty = if expiring { config.expiring_penalty } else { 0 };
    (tier.base_score() - workload_penalty(level, config) - expiring_penalty).clamp(MIN_SCORE, MAX_SCORE)
}

/// 教室类型兼容基础分
///
/// # 返回
/// - None: 不兼容 (容量不足当前人数, 或类型不满足要求)
pub(crate) fn room_base_score(course: &Course, room: &Room) -> Option<i32> {
    // 硬约束: 容量必须容纳当前选课人数
    if room.capacity < course.current_enrollment {
        return None;
    }

    if let Some(required) = course.required_room_type {
        if room.room_type == required {
            return Some(ROOM_EXACT_TYPE_SCORE);
        }
        if required.same_family(room.room_type) {
            return Some(ROOM_SAME_FAMILY_SCORE);
        }
        return None;
    }

    if course.requires_lab {
        return room.room_type.is_lab().then_some(ROOM_LAB_REQUIREMENT_SCORE);
    }

    Some(match room.room_type {
        RoomType::Classroom => ROOM_GENERAL_CLASSROOM_SCORE,
        RoomType::Multipurpose | RoomType::Other => ROOM_MULTI_USE_SCORE,
        _ => ROOM_SPECIALIZED_SCORE,
    })
}

/// 教室候选分
///
/// # 参数
/// - hosted_courses: 该教室已承载的其他课程数
pub(crate) fn room_score(
    course: &Course,
    room: &Room,
    hosted_courses: usize,
    config: &AssignmentConfig,
) -> Option<i32> {
    let base = room_base_score(course, room)?;

    let shortfall = match course.max_students {
        Some(max) if room.capacity < max => config.room_shortfall_penalty,
        _ => 0,
    };
    let occupied = config.room_occupied_penalty.saturating_mul(hosted_courses as i32);

    Some((base - shortfall - occupied).clamp(MIN_SCORE, MAX_SCORE))
}

/// 推荐优先级
///
/// # 规则
/// - 必修 + (无候选 或 存在违规) → Critical
/// - 必修 + 有候选 → High
/// - 非必修: 分数 ≥ 阈值 → Normal, 否则 Low (无候选视为 0 分)
pub(crate) fn priority_for(
    core_required: bool,
    best_score: Option<i32>,
    has_violation: bool,
    config: &AssignmentConfig,
) -> RecommendationPriority {
    if core_required {
        if best_score.is_none() || has_violation {
            return RecommendationPriority::Critical;
        }
        return RecommendationPriority::High;
    }

    match best_score {
        Some(score) if score >= config.normal_priority_min_score => RecommendationPriority::Normal,
        _ => RecommendationPriority::Low,
    }
}
