// ==========================================
// 排课分配引擎 - 合规审计
// ==========================================
// 职责: 找出"有教师但教师无资格"的课程, 给出替代人与纠正建议
// 红线: 审计只产出建议, 纠正统一走 BulkAssignmentExecutor::apply
// ==========================================

use crate::config::AssignmentConfig;
use crate::domain::types::{RecommendationPriority, ViolationSeverity};
use crate::domain::{
    ComplianceViolation, Course, CourseAssignmentRecommendation, ExpiringCertificationNotice,
    Teacher,
};
use crate::engine::qualification::QualificationResolver;
use crate::engine::recommendation::{CurrentTeacherState, RecommendationEngine};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::instrument;

// ==========================================
// ComplianceAuditor - 合规审计器
// ==========================================
pub struct ComplianceAuditor {
    engine: RecommendationEngine,
}

impl ComplianceAuditor {
    pub fn new(config: AssignmentConfig) -> Self {
        Self {
            engine: RecommendationEngine::new(config),
        }
    }

    /// 审计在开课程
    ///
    /// # 规则
    /// - 当前教师存在于 teachers 中, 但 is_qualified 为 false → 违规
    /// - 替代人: 其余在职且 is_qualified 的教师 (按 teacher_id 升序)
    /// - 必修课 → High, 选修 → Medium; High 在前, 再按 course_id
    #[instrument(skip(self, courses, teachers), fields(courses = courses.len()))]
    pub fn audit(
        &self,
        courses: &[Course],
        teachers: &[Teacher],
        today: NaiveDate,
    ) -> Vec<ComplianceViolation> {
        let by_id: HashMap<i64, &Teacher> = teachers.iter().map(|t| (t.teacher_id, t)).collect();

        let mut violations: Vec<ComplianceViolation> = courses
            .iter()
            .filter(|c| c.active)
            .filter_map(|course| {
                let current = course.teacher_id.and_then(|id| by_id.get(&id).copied())?;
                if QualificationResolver::is_qualified(current, course, today) {
                    return None;
                }
                Some(self.build_violation(course, current, teachers, today))
            })
            .collect();

        violations.sort_by(|a, b| {
            a.severity
                .cmp(&b.severity)
                .then_with(|| a.course.course_id.cmp(&b.course.course_id))
        });

        if !violations.is_empty() {
            tracing::warn!(violations = violations.len(), "发现任教资格违规");
        }
        violations
    }

    fn build_violation(
        &self,
        course: &Course,
        current: &Teacher,
        teachers: &[Teacher],
        today: NaiveDate,
    ) -> ComplianceViolation {
        let mut alternatives: Vec<Teacher> = teachers
            .iter()
            .filter(|t| {
                t.active
                    && t.teacher_id != current.teacher_id
                    && QualificationResolver::is_qualified(t, course, today)
            })
            .cloned()
            .collect();
        alternatives.sort_by_key(|t| t.teacher_id);

        let severity = if course.core_required {
            ViolationSeverity::High
        } else {
            ViolationSeverity::Medium
        };

        let mut correction = self.engine.build_teacher_recommendation(
            course,
            teachers,
            CurrentTeacherState::Unqualified,
            today,
        );
        correction.priority = RecommendationPriority::Critical;

        ComplianceViolation {
            course: course.clone(),
            current_teacher: current.clone(),
            auto_correct_available: !alternatives.is_empty(),
            qualified_alternatives: alternatives,
            severity,
            description: format!(
                "Teacher {} is not qualified to teach {} ({})",
                current.name,
                course.course_code,
                course.subject.as_deref().unwrap_or("no subject")
            ),
            proposed_correction: correction.is_actionable().then_some(correction),
        }
    }

    /// 违规中可直接提交的纠正建议
    pub fn corrections(violations: &[ComplianceViolation]) -> Vec<CourseAssignmentRecommendation> {
        violations
            .iter()
            .filter_map(|v| v.proposed_correction.clone())
            .collect()
    }

    /// 即将到期的结构化证书提醒 (在职教师)
    ///
    /// 按剩余天数升序, 再按 teacher_id
    pub fn expiring_certifications(
        &self,
        teachers: &[Teacher],
        today: NaiveDate,
    ) -> Vec<ExpiringCertificationNotice> {
        let lookahead = self.engine.config().expiring_lookahead_days;

        let mut notices: Vec<ExpiringCertificationNotice> = teachers
            .iter()
            .filter(|t| t.active)
            .flat_map(|teacher| {
                QualificationResolver::expiring_certifications(teacher, today, lookahead)
                    .into_iter()
                    .filter_map(move |cert| {
                        let expiration_date = cert.expiration_date?;
                        Some(ExpiringCertificationNotice {
                            teacher_id: teacher.teacher_id,
                            teacher_name: teacher.name.clone(),
                            subject: cert.subject.clone(),
                            expiration_date,
                            days_remaining: (expiration_date - today).num_days(),
                        })
                    })
            })
            .collect();

        notices.sort_by(|a, b| {
            a.days_remaining
                .cmp(&b.days_remaining)
                .then_with(|| a.teacher_id.cmp(&b.teacher_id))
        });
        notices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SubjectCertification;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
    }

    fn auditor() -> ComplianceAuditor {
        ComplianceAuditor::new(AssignmentConfig::default())
    }

    fn teacher_with_legacy(id: i64, cert: &str) -> Teacher {
        let mut teacher = Teacher::new(id, &format!("T{}", id));
        teacher.certifications = vec![cert.to_string()];
        teacher
    }

    #[test]
    fn test_detects_unqualified_teacher_with_alternatives() {
        let teachers = vec![
            teacher_with_legacy(1, "Art"),
            teacher_with_legacy(2, "Physics"),
            teacher_with_legacy(3, "Physics Honors"),
        ];
        let mut course = Course::new(10, "PHY-1", "Physics");
        course.teacher_id = Some(1);

        let violations = auditor().audit(&[course], &teachers, today());
        assert_eq!(violations.len(), 1);
        let v = &violations[0];
        assert!(v.auto_correct_available);
        assert_eq!(v.severity, ViolationSeverity::Medium);
        let alt_ids: Vec<i64> = v.qualified_alternatives.iter().map(|t| t.teacher_id).collect();
        assert_eq!(alt_ids, vec![2, 3]);

        let correction = v.proposed_correction.as_ref().unwrap();
        assert_eq!(correction.priority, RecommendationPriority::Critical);
        assert_eq!(correction.current_teacher_id, Some(1));
    }

    #[test]
    fn test_no_alternatives_means_no_auto_correct() {
        let teachers = vec![teacher_with_legacy(1, "Art")];
        let mut course = Course::new(10, "PHY-1", "Physics");
        course.core_required = true;
        course.teacher_id = Some(1);

        let violations = auditor().audit(&[course], &teachers, today());
        assert!(!violations[0].auto_correct_available);
        assert!(violations[0].proposed_correction.is_none());
        assert_eq!(violations[0].severity, ViolationSeverity::High);
        assert!(ComplianceAuditor::corrections(&violations).is_empty());
    }

    #[test]
    fn test_missing_or_qualified_teachers_are_not_violations() {
        let teachers = vec![teacher_with_legacy(1, "Physics")];
        let mut ok = Course::new(1, "PHY-1", "Physics");
        ok.teacher_id = Some(1);
        let mut ghost = Course::new(2, "PHY-2", "Physics");
        ghost.teacher_id = Some(42);
        let empty = Course::new(3, "PHY-3", "Physics");

        assert!(auditor().audit(&[ok, ghost, empty], &teachers, today()).is_empty());
    }

    #[test]
    fn test_high_severity_sorted_first() {
        let teachers = vec![teacher_with_legacy(1, "Art")];
        let mut elective = Course::new(1, "PHY-E", "Physics");
        elective.teacher_id = Some(1);
        let mut core = Course::new(2, "PHY-C", "Physics");
        core.teacher_id = Some(1);
        core.core_required = true;

        let violations = auditor().audit(&[elective, core], &teachers, today());
        assert_eq!(violations[0].course.course_id, 2);
        assert_eq!(violations[1].course.course_id, 1);
    }

    #[test]
    fn test_expiring_certification_notices() {
        let mut teacher = Teacher::new(1, "Soon");
        teacher.subject_certifications = vec![
            SubjectCertification::new("Chemistry")
                .expiring_on(NaiveDate::from_ymd_opt(2026, 9, 11).unwrap()),
            SubjectCertification::new("Biology")
                .expiring_on(NaiveDate::from_ymd_opt(2027, 9, 11).unwrap()),
        ];

        let notices = auditor().expiring_certifications(&[teacher], today());
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].subject, "Chemistry");
        assert_eq!(notices[0].days_remaining, 10);
    }

    #[test]
    fn test_unbounded_lookahead_lists_every_future_expiry() {
        let config = AssignmentConfig {
            expiring_lookahead_days: i64::MAX,
            ..AssignmentConfig::default()
        };
        let mut teacher = Teacher::new(1, "Far");
        teacher.subject_certifications = vec![SubjectCertification::new("Chemistry")
            .expiring_on(NaiveDate::from_ymd_opt(2040, 1, 1).unwrap())];

        let notices = ComplianceAuditor::new(config).expiring_certifications(&[teacher], today());
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].subject, "Chemistry");
    }
}
