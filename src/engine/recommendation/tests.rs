use super::RecommendationEngine;
use crate::config::AssignmentConfig;
use crate::domain::types::{QualificationTier, RecommendationPriority, RoomType};
use crate::domain::{Course, Room, SubjectCertification, Teacher};
use chrono::NaiveDate;

// ==========================================
// 测试辅助函数
// ==========================================

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
}

fn engine() -> RecommendationEngine {
    RecommendationEngine::new(AssignmentConfig::default())
}

fn certified_teacher(id: i64, subject: &str, owned: usize) -> Teacher {
    let mut teacher = Teacher::new(id, &format!("Teacher {}", id));
    teacher.subject_certifications.push(SubjectCertification::new(subject));
    // 占位课程 id 从 1000 起, 不与测试课程冲突
    teacher
        .course_ids
        .extend((0..owned as i64).map(|i| 1000 + id * 100 + i));
    teacher
}

fn core_course(id: i64, subject: &str) -> Course {
    let mut course = Course::new(id, &format!("C-{}", id), subject);
    course.core_required = true;
    course
}

// ==========================================
// 测试 1: 目标课程筛选
// ==========================================

#[test]
fn test_only_courses_without_qualified_teacher_are_targets() {
    let teachers = vec![certified_teacher(1, "Math", 0)];

    let mut covered = Course::new(1, "M-1", "Math");
    covered.teacher_id = Some(1);
    let uncovered = Course::new(2, "M-2", "Math");
    let mut ghost = Course::new(3, "M-3", "Math");
    ghost.teacher_id = Some(99);
    let mut closed = Course::new(4, "M-4", "Math");
    closed.active = false;

    let recs = engine().recommend_teachers(&[covered, uncovered, ghost, closed], &teachers, today());
    let ids: Vec<i64> = recs.iter().map(|r| r.course.course_id).collect();
    assert_eq!(ids, vec![2, 3]);
    assert!(recs[1].reasoning.contains("not found"));
}

#[test]
fn test_unqualified_current_teacher_is_target_and_critical_when_core() {
    let mut wrong = Teacher::new(1, "Wrong");
    wrong.department = Some("Art".to_string());
    let teachers = vec![wrong, certified_teacher(2, "Physics", 0)];

    let mut course = core_course(10, "Physics");
    course.teacher_id = Some(1);

    let recs = engine().recommend_teachers(&[course], &teachers, today());
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].priority, RecommendationPriority::Critical);
    assert_eq!(recs[0].recommended_teacher.as_ref().map(|t| t.teacher_id), Some(2));
}

// ==========================================
// 测试 2: 评分与排序
// ==========================================

#[test]
fn test_score_combines_tier_workload_and_expiring_penalties() {
    // Structured 80 - Light 5 - expiring 10 = 65
    let mut teacher = certified_teacher(1, "Biology", 2);
    teacher.subject_certifications[0] = SubjectCertification::new("Biology")
        .expiring_on(NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());

    let course = Course::new(1, "BIO", "Biology");
    let teachers = vec![teacher];
    let candidates = engine().rank_teacher_candidates(&course, &teachers, today());
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].tier, QualificationTier::Structured);
    assert_eq!(candidates[0].score, 65);
    assert!(candidates[0].expiring);
}

#[test]
fn test_huge_lookahead_marks_expiring_without_panic() {
    let config = AssignmentConfig {
        expiring_lookahead_days: i64::MAX,
        ..AssignmentConfig::default()
    };
    let mut teacher = certified_teacher(1, "Biology", 2);
    teacher.subject_certifications[0] = SubjectCertification::new("Biology")
        .expiring_on(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());

    let course = Course::new(1, "BIO", "Biology");
    let teachers = vec![teacher];
    let candidates =
        RecommendationEngine::new(config).rank_teacher_candidates(&course, &teachers, today());
    assert_eq!(candidates.len(), 1);
    assert!(candidates[0].expiring);
    assert_eq!(candidates[0].score, 65);
}

#[test]
fn test_ties_broken_by_course_count_then_teacher_id() {
    // 同为 Light 档, 分数相同
    let teachers = vec![
        certified_teacher(3, "History", 1),
        certified_teacher(2, "History", 2),
        certified_teacher(1, "History", 2),
    ];
    let course = Course::new(1, "HIS", "History");

    let candidates = engine().rank_teacher_candidates(&course, &teachers, today());
    let order: Vec<i64> = candidates.iter().map(|c| c.teacher.teacher_id).collect();
    assert_eq!(order, vec![3, 1, 2]);
}

#[test]
fn test_overloaded_excluded_unless_only_candidates() {
    let course = Course::new(1, "ENG", "English");

    let teachers = vec![certified_teacher(1, "English", 7), certified_teacher(2, "English", 5)];
    let candidates = engine().rank_teacher_candidates(&course, &teachers, today());
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].teacher.teacher_id, 2);

    let teachers = vec![certified_teacher(1, "English", 7)];
    let candidates = engine().rank_teacher_candidates(&course, &teachers, today());
    assert_eq!(candidates.len(), 1);
    // 80 - 50
    assert_eq!(candidates[0].score, 30);
}

#[test]
fn test_inactive_teachers_are_never_candidates() {
    let mut teacher = certified_teacher(1, "Music", 0);
    teacher.active = false;
    let course = Course::new(1, "MUS", "Music");

    let teachers = vec![teacher];
    assert!(engine().rank_teacher_candidates(&course, &teachers, today()).is_empty());
}

// ==========================================
// 测试 3: 优先级
// ==========================================

#[test]
fn test_priority_tiers() {
    let teachers = vec![certified_teacher(1, "Chemistry", 0)];
    let mut dept_only = Teacher::new(2, "Dept");
    dept_only.department = Some("Drama".to_string());
    let teachers_with_dept = vec![dept_only];

    let core_with_candidate = core_course(1, "Chemistry");
    let core_without_candidate = core_course(2, "Latin");
    let elective_high_score = Course::new(3, "CH-E", "Chemistry");
    let elective_low_score = Course::new(4, "DR-E", "Drama");

    let recs = engine().recommend_teachers(
        &[
            elective_high_score.clone(),
            core_with_candidate,
            core_without_candidate,
        ],
        &teachers,
        today(),
    );
    let priorities: Vec<(i64, RecommendationPriority)> =
        recs.iter().map(|r| (r.course.course_id, r.priority)).collect();
    assert_eq!(
        priorities,
        vec![
            (2, RecommendationPriority::Critical),
            (1, RecommendationPriority::High),
            (3, RecommendationPriority::Normal),
        ]
    );
    assert!(recs[0].reasoning.contains("no qualified teacher"));
    assert!(!recs[0].is_actionable());

    // Department 40 < 60 → Low
    let recs = engine().recommend_teachers(&[elective_low_score], &teachers_with_dept, today());
    assert_eq!(recs[0].priority, RecommendationPriority::Low);
    assert_eq!(recs[0].match_score, 40);
}

#[test]
fn test_recommendation_carries_course_revision() {
    let mut course = Course::new(1, "GEO", "Geography");
    course.revision = 7;
    let teachers = vec![certified_teacher(1, "Geography", 0)];

    let recs = engine().recommend_teachers(&[course], &teachers, today());
    assert_eq!(recs[0].course_revision, 7);
    assert_eq!(recs[0].match_score, 80);
}

// ==========================================
// 测试 4: 教室推荐
// ==========================================

#[test]
fn test_room_capacity_is_hard_requirement() {
    let mut course = Course::new(1, "PE", "PE");
    course.current_enrollment = 30;
    let rooms = vec![
        Room::new(1, "101", RoomType::Classroom, 25),
        Room::new(2, "102", RoomType::Classroom, 30),
    ];

    let recs = engine().recommend_rooms(&[course], &rooms);
    assert_eq!(recs[0].recommended_room.as_ref().map(|r| r.room_id), Some(2));
}

#[test]
fn test_room_type_requirements() {
    let mut lab_course = Course::new(1, "CHEM-L", "Chemistry");
    lab_course.required_room_type = Some(RoomType::ScienceLab);
    let mut any_lab = Course::new(2, "CS", "Computer Science");
    any_lab.requires_lab = true;
    let plain = Course::new(3, "LIT", "Literature");

    let rooms = vec![
        Room::new(1, "G1", RoomType::Gymnasium, 100),
        Room::new(2, "S1", RoomType::StemLab, 30),
        Room::new(3, "C1", RoomType::Classroom, 30),
    ];

    let recs = engine().recommend_rooms(&[lab_course, any_lab, plain], &rooms);
    let picks: Vec<(i64, Option<i64>, i32)> = recs
        .iter()
        .map(|r| (r.course.course_id, r.recommended_room.as_ref().map(|x| x.room_id), r.match_score))
        .collect();
    // 同族 70; 实验室要求 90; 普通教室 80
    assert_eq!(picks, vec![(1, Some(2), 70), (2, Some(2), 90), (3, Some(3), 80)]);
}

#[test]
fn test_room_penalties_for_shortfall_and_occupancy() {
    let mut hosted = Course::new(1, "A", "Art");
    hosted.room_id = Some(1);
    let mut course = Course::new(2, "B", "Art");
    course.max_students = Some(40);

    let rooms = vec![
        Room::new(1, "R1", RoomType::Classroom, 50),
        Room::new(2, "R2", RoomType::Classroom, 35),
    ];

    let recs = engine().recommend_rooms(&[hosted, course], &rooms);
    assert_eq!(recs.len(), 1);
    // R1: 80 - 10 (占用 1 门) = 70; R2: 80 - 15 (容量不足 max) = 65
    assert_eq!(recs[0].recommended_room.as_ref().map(|r| r.room_id), Some(1));
    assert_eq!(recs[0].match_score, 70);
}

#[test]
fn test_no_compatible_room_is_critical_for_core_course() {
    let mut course = core_course(1, "Biology");
    course.requires_lab = true;
    let rooms = vec![Room::new(1, "C1", RoomType::Classroom, 30)];

    let recs = engine().recommend_rooms(&[course], &rooms);
    assert_eq!(recs[0].priority, RecommendationPriority::Critical);
    assert!(recs[0].reasoning.contains("no compatible room"));
}
