// ==========================================
// 排课分配引擎 - 工作量分档
// ==========================================
// 红线: 工作量是"分档制", 只看已拥有课程数
// ==========================================

use crate::domain::types::WorkloadLevel;
use crate::domain::Teacher;

/// Light 档下限 (含)
pub const LIGHT_MIN_COURSES: usize = 1;
/// Normal 档下限 (含)
pub const NORMAL_MIN_COURSES: usize = 4;
/// Overloaded 档下限 (含)
pub const OVERLOADED_MIN_COURSES: usize = 6;

pub struct WorkloadClassifier;

impl WorkloadClassifier {
    /// 按课程数分档
    ///
    /// 0 → Underutilized, 1-3 → Light, 4-5 → Normal, ≥6 → Overloaded
    pub fn classify_count(course_count: usize) -> WorkloadLevel {
        if course_count >= OVERLOADED_MIN_COURSES {
            WorkloadLevel::Overloaded
        } else if course_count >= NORMAL_MIN_COURSES {
            WorkloadLevel::Normal
        } else if course_count >= LIGHT_MIN_COURSES {
            WorkloadLevel::Light
        } else {
            WorkloadLevel::Underutilized
        }
    }

    pub fn classify(teacher: &Teacher) -> WorkloadLevel {
        Self::classify_count(teacher.course_count())
    }

    pub fn is_overloaded(teacher: &Teacher) -> bool {
        Self::classify(teacher) == WorkloadLevel::Overloaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(WorkloadClassifier::classify_count(0), WorkloadLevel::Underutilized);
        assert_eq!(WorkloadClassifier::classify_count(1), WorkloadLevel::Light);
        assert_eq!(WorkloadClassifier::classify_count(3), WorkloadLevel::Light);
        assert_eq!(WorkloadClassifier::classify_count(4), WorkloadLevel::Normal);
        assert_eq!(WorkloadClassifier::classify_count(5), WorkloadLevel::Normal);
        assert_eq!(WorkloadClassifier::classify_count(6), WorkloadLevel::Overloaded);
        assert_eq!(WorkloadClassifier::classify_count(40), WorkloadLevel::Overloaded);
    }

    #[test]
    fn test_classify_teacher() {
        let mut teacher = Teacher::new(1, "A");
        assert_eq!(WorkloadClassifier::classify(&teacher), WorkloadLevel::Underutilized);

        teacher.course_ids.extend(1..=6);
        assert!(WorkloadClassifier::is_overloaded(&teacher));
    }
}
