// ==========================================
// 合规审计集成测试
// ==========================================
// 职责: 验证 Audit → 纠正建议 → ApplyCorrections 全链路
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

mod helpers;

use chrono::Duration;
use course_assignment::api::AssignmentApi;
use course_assignment::config::AssignmentConfig;
use course_assignment::domain::types::{RecommendationPriority, ViolationSeverity};
use course_assignment::repository::SchoolDataPort;
use helpers::mock_config::MockConfig;
use helpers::test_data_builder::{today, CourseBuilder, TeacherBuilder};
use test_helpers::{seed, setup_repos};

// ==========================================
// 场景: 当前教师无资格, 另有合格教师
// ==========================================

#[test]
fn test_unqualified_assignment_detected_with_auto_correction() {
    let (_tmp, _path, repos) = setup_repos();
    let teachers = vec![
        TeacherBuilder::new(1).name("Alice").department("Art").certified("Painting").build(),
        TeacherBuilder::new(2).name("Bob").certified("Physics").build(),
        TeacherBuilder::new(3).name("Carol").certified("Physics").inactive().build(),
    ];
    let courses = vec![CourseBuilder::new(10, "Physics").core().teacher(1).build()];
    seed(&repos, &teachers, &courses, &[]);

    let api = AssignmentApi::new(repos.clone(), AssignmentConfig::default());
    let violations = api.audit(today()).unwrap();

    assert_eq!(violations.len(), 1);
    let violation = &violations[0];
    assert_eq!(violation.course.course_id, 10);
    assert_eq!(violation.current_teacher.teacher_id, 1);
    assert!(violation.auto_correct_available);
    assert_eq!(violation.severity, ViolationSeverity::High);
    // 在职且合格的替代人选, 不含停职教师
    let alternatives: Vec<i64> = violation
        .qualified_alternatives
        .iter()
        .map(|t| t.teacher_id)
        .collect();
    assert_eq!(alternatives, vec![2]);

    let correction = violation.proposed_correction.as_ref().unwrap();
    assert_eq!(correction.priority, RecommendationPriority::Critical);
    assert_eq!(
        correction.recommended_teacher.as_ref().map(|t| t.teacher_id),
        Some(2)
    );
}

#[test]
fn test_violation_without_alternative_is_not_auto_correctable() {
    let (_tmp, _path, repos) = setup_repos();
    let teachers = vec![TeacherBuilder::new(1).department("Music").build()];
    let courses = vec![CourseBuilder::new(10, "Latin").teacher(1).build()];
    seed(&repos, &teachers, &courses, &[]);

    let api = AssignmentApi::new(repos.clone(), AssignmentConfig::default());
    let violations = api.audit(today()).unwrap();

    assert_eq!(violations.len(), 1);
    assert!(!violations[0].auto_correct_available);
    assert!(violations[0].proposed_correction.is_none());
    assert_eq!(violations[0].severity, ViolationSeverity::Medium);
}

#[test]
fn test_apply_corrections_reassigns_and_clears_audit() {
    let (_tmp, _path, repos) = setup_repos();
    let teachers = vec![
        TeacherBuilder::new(1).department("Art").build(),
        TeacherBuilder::new(2).certified("Physics").build(),
    ];
    let courses = vec![
        CourseBuilder::new(10, "Physics").core().teacher(1).build(),
        CourseBuilder::new(11, "Physics").teacher(2).build(),
    ];
    seed(&repos, &teachers, &courses, &[]);

    let api = AssignmentApi::new(repos.clone(), AssignmentConfig::default());
    let result = api.apply_corrections("campus-a", today()).unwrap();
    assert_eq!(result.total_processed, 1);
    assert_eq!(result.assigned, 1);

    assert_eq!(repos.find_course(10).unwrap().unwrap().teacher_id, Some(2));
    assert!(repos.find_teacher(2).unwrap().unwrap().owns_course(10));
    assert!(api.audit(today()).unwrap().is_empty());
}

#[test]
fn test_qualified_assignment_is_not_flagged() {
    let (_tmp, _path, repos) = setup_repos();
    let teachers = vec![
        TeacherBuilder::new(1).legacy_certification("AP Chemistry Endorsement").build(),
        TeacherBuilder::new(2).department("Science Department").build(),
    ];
    let courses = vec![
        CourseBuilder::new(10, "Chemistry").teacher(1).build(),
        CourseBuilder::new(11, "Science").teacher(2).build(),
    ];
    seed(&repos, &teachers, &courses, &[]);

    let api = AssignmentApi::new(repos.clone(), AssignmentConfig::default());
    assert!(api.audit(today()).unwrap().is_empty());
}

// ==========================================
// 证书到期提醒
// ==========================================

#[tokio::test]
async fn test_expiring_certifications_respect_configured_lookahead() {
    let (_tmp, _path, repos) = setup_repos();
    let teachers = vec![
        TeacherBuilder::new(1)
            .certified_until("Math", today() + Duration::days(20))
            .build(),
        TeacherBuilder::new(2)
            .certified_until("Math", today() + Duration::days(60))
            .build(),
        TeacherBuilder::new(3)
            .certified_until("Math", today() - Duration::days(1))
            .build(),
    ];
    seed(&repos, &teachers, &[], &[]);

    let mut config = MockConfig::default();
    config.expiring_lookahead_days = 30;
    let api = AssignmentApi::from_config_reader(repos.clone(), &config)
        .await
        .unwrap();

    let notices = api.expiring_certifications(today()).unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].teacher_id, 1);
    assert_eq!(notices[0].days_remaining, 20);
}
