// ==========================================
// 排课分配引擎 - 分配状态派生
// ==========================================
// 红线: 状态永不落库, 只由 teacher_id / room_id 派生
// ==========================================

use crate::domain::types::AssignmentStatus;
use crate::domain::Course;

pub struct AssignmentStatusDeriver;

impl AssignmentStatusDeriver {
    pub fn status(course: &Course) -> AssignmentStatus {
        match (course.teacher_id.is_some(), course.room_id.is_some()) {
            (true, true) => AssignmentStatus::Assigned,
            (false, false) => AssignmentStatus::Unassigned,
            _ => AssignmentStatus::Partial,
        }
    }

    /// 按状态统计 (Unassigned, Partial, Assigned)
    pub fn summarize(courses: &[Course]) -> (usize, usize, usize) {
        courses.iter().fold((0, 0, 0), |(u, p, a), c| match Self::status(c) {
            AssignmentStatus::Unassigned => (u + 1, p, a),
            AssignmentStatus::Partial => (u, p + 1, a),
            AssignmentStatus::Assigned => (u, p, a + 1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_four_combinations() {
        let mut course = Course::new(1, "BIO-1", "Biology");
        assert_eq!(AssignmentStatusDeriver::status(&course), AssignmentStatus::Unassigned);

        course.teacher_id = Some(7);
        assert_eq!(AssignmentStatusDeriver::status(&course), AssignmentStatus::Partial);

        course.room_id = Some(3);
        assert_eq!(AssignmentStatusDeriver::status(&course), AssignmentStatus::Assigned);

        course.teacher_id = None;
        assert_eq!(AssignmentStatusDeriver::status(&course), AssignmentStatus::Partial);
    }

    #[test]
    fn test_summarize() {
        let mut assigned = Course::new(1, "A", "Art");
        assigned.teacher_id = Some(1);
        assigned.room_id = Some(1);
        let mut partial = Course::new(2, "B", "Art");
        partial.room_id = Some(1);
        let empty = Course::new(3, "C", "Art");

        assert_eq!(
            AssignmentStatusDeriver::summarize(&[assigned, partial, empty]),
            (1, 1, 1)
        );
    }
}
