use super::scoring::{priority_for, teacher_score};
use crate::config::AssignmentConfig;
use crate::domain::types::{QualificationTier, WorkloadLevel};
use crate::domain::{CourseAssignmentRecommendation, Course, Teacher};
use crate::engine::qualification::QualificationResolver;
use crate::engine::workload::WorkloadClassifier;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::instrument;

// ==========================================
// TeacherCandidate - 单个教师候选
// ==========================================
#[derive(Debug, Clone)]
pub struct TeacherCandidate<'a> {
    pub teacher: &'a Teacher,
    pub tier: QualificationTier,
    pub workload: WorkloadLevel,
    pub expiring: bool,
    pub score: i32,
}

impl TeacherCandidate<'_> {
    fn describe(&self) -> String {
        let mut text = format!(
            "{} (teacher {}) via {} certification, workload {}, score {}",
            self.teacher.name, self.teacher.teacher_id, self.tier, self.workload, self.score
        );
        if self.expiring {
            text.push_str(", certification expiring soon");
        }
        text
    }
}

/// 课程当前教师的状况
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CurrentTeacherState {
    Missing,     // 未分配
    NotFound,    // 引用的教师不存在
    Inactive,    // 教师已停用
    Unqualified, // 教师存在但无资格 (合规违规)
    Qualified,
}

// ==========================================
// RecommendationEngine - 推荐引擎
// ==========================================
pub struct RecommendationEngine {
    config: AssignmentConfig,
}

impl RecommendationEngine {
    pub fn new(config: AssignmentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AssignmentConfig {
        &self.config
    }

    // ==========================================
    // 教师推荐
    // ==========================================

    /// 为缺少合格教师的在开课程生成推荐
    ///
    /// 输出按优先级 (Critical 在前) 再按 course_id 排序
    #[instrument(skip(self, courses, teachers), fields(courses = courses.len(), teachers = teachers.len()))]
    pub fn recommend_teachers(
        &self,
        courses: &[Course],
        teachers: &[Teacher],
        today: NaiveDate,
    ) -> Vec<CourseAssignmentRecommendation> {
        let by_id: HashMap<i64, &Teacher> = teachers.iter().map(|t| (t.teacher_id, t)).collect();

        let mut recommendations: Vec<CourseAssignmentRecommendation> = courses
            .iter()
            .filter(|c| c.active)
            .filter_map(|course| {
                let state = Self::current_teacher_state(course, &by_id, today);
                if state == CurrentTeacherState::Qualified {
                    return None;
                }
                Some(self.build_teacher_recommendation(course, teachers, state, today))
            })
            .collect();

        recommendations.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.course.course_id.cmp(&b.course.course_id))
        });

        tracing::debug!(recommendations = recommendations.len(), "教师推荐生成完成");
        recommendations
    }

    /// 课程是否需要 (重新) 分配教师
    pub fn needs_teacher(&self, course: &Course, teachers: &[Teacher], today: NaiveDate) -> bool {
        let by_id: HashMap<i64, &Teacher> = teachers.iter().map(|t| (t.teacher_id, t)).collect();
        course.active && Self::current_teacher_state(course, &by_id, today) != CurrentTeacherState::Qualified
    }

    pub(crate) fn current_teacher_state(
        course: &Course,
        by_id: &HashMap<i64, &Teacher>,
        today: NaiveDate,
    ) -> CurrentTeacherState {
        let Some(teacher_id) = course.teacher_id else {
            return CurrentTeacherState::Missing;
        };
        match by_id.get(&teacher_id) {
            None => CurrentTeacherState::NotFound,
            Some(t) if !t.active => CurrentTeacherState::Inactive,
            Some(t) if !QualificationResolver::is_qualified(t, course, today) => {
                CurrentTeacherState::Unqualified
            }
            Some(_) => CurrentTeacherState::Qualified,
        }
    }

    pub(crate) fn build_teacher_recommendation(
        &self,
        course: &Course,
        teachers: &[Teacher],
        state: CurrentTeacherState,
        today: NaiveDate,
    ) -> CourseAssignmentRecommendation {
        let candidates = self.rank_teacher_candidates(course, teachers, today);
        let best = candidates.first();
        let has_violation = state == CurrentTeacherState::Unqualified;

        let situation = match state {
            CurrentTeacherState::Missing => "course has no teacher".to_string(),
            CurrentTeacherState::NotFound => format!(
                "current teacher {} not found",
                course.teacher_id.unwrap_or_default()
            ),
            CurrentTeacherState::Inactive => "current teacher is inactive".to_string(),
            CurrentTeacherState::Unqualified => format!(
                "current teacher is not qualified for {}",
                course.subject.as_deref().unwrap_or("(no subject)")
            ),
            CurrentTeacherState::Qualified => "current teacher is qualified".to_string(),
        };

        let reasoning = match best {
            Some(c) => format!(
                "{}; recommend {} ({} candidates)",
                situation,
                c.describe(),
                candidates.len()
            ),
            None => format!("{}; no qualified teacher", situation),
        };

        CourseAssignmentRecommendation {
            course: course.clone(),
            current_teacher_id: course.teacher_id,
            recommended_teacher: best.map(|c| c.teacher.clone()),
            tier: best.map(|c| c.tier),
            match_score: best.map(|c| c.score).unwrap_or(0),
            priority: priority_for(
                course.core_required,
                best.map(|c| c.score),
                has_violation,
                &self.config,
            ),
            reasoning,
            course_revision: course.revision,
        }
    }

    /// 课程的全部合格教师候选 (已排序)
    ///
    /// # 规则
    /// - 候选: 在职 + is_qualified
    /// - Overloaded 候选仅在其为唯一候选时保留
    /// - 排序: 分数降序 → 课程数升序 → teacher_id 升序
    pub fn rank_teacher_candidates<'a>(
        &self,
        course: &Course,
        teachers: &'a [Teacher],
        today: NaiveDate,
    ) -> Vec<TeacherCandidate<'a>> {
        let mut candidates: Vec<TeacherCandidate<'a>> = teachers
            .iter()
            .filter(|t| t.active)
            .filter_map(|teacher| {
                let tier = QualificationResolver::qualification_tier(teacher, course, today)?;
                let workload = WorkloadClassifier::classify(teacher);
                let expiring = QualificationResolver::has_expiring_certifications(
                    teacher,
                    today,
                    self.config.expiring_lookahead_days,
                );
                Some(TeacherCandidate {
                    teacher,
                    tier,
                    workload,
                    expiring,
                    score: teacher_score(tier, workload, expiring, &self.config),
                })
            })
            .collect();

        if candidates.iter().any(|c| c.workload != WorkloadLevel::Overloaded) {
            candidates.retain(|c| c.workload != WorkloadLevel::Overloaded);
        }

        candidates.sort_by(Self::compare_candidates);
        candidates
    }

    fn compare_candidates(a: &TeacherCandidate<'_>, b: &TeacherCandidate<'_>) -> Ordering {
        b.score
            .cmp(&a.score)
            .then_with(|| a.teacher.course_count().cmp(&b.teacher.course_count()))
            .then_with(|| a.teacher.teacher_id.cmp(&b.teacher.teacher_id))
    }
}
