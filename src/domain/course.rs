// ==========================================
// 排课分配引擎 - 课程与教室领域模型
// ==========================================
// 红线: 分配状态不落库, 一律通过 AssignmentStatusDeriver 派生
// ==========================================

use crate::domain::types::RoomType;
use serde::{Deserialize, Serialize};

// ==========================================
// Course - 课程
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    // ===== 主键 =====
    pub course_id: i64,
    pub course_code: String,
    pub course_name: String,

    // ===== 学科属性 =====
    pub subject: Option<String>, // 学科(自由文本)
    pub core_required: bool,     // 是否必修核心课
    pub active: bool,

    // ===== 分配引用 =====
    pub teacher_id: Option<i64>,
    pub room_id: Option<i64>,

    // ===== 教室匹配属性 =====
    pub current_enrollment: i32,             // 当前选课人数
    pub max_students: Option<i32>,           // 最大容量
    pub required_room_type: Option<RoomType>, // 指定教室类型
    pub requires_lab: bool,                  // 是否需要实验室

    // ===== 并发控制 =====
    pub revision: i32, // 乐观锁版本号
}

impl Course {
    /// 创建一门在开、未分配的课程
    pub fn new(course_id: i64, course_code: &str, subject: &str) -> Self {
        Self {
            course_id,
            course_code: course_code.to_string(),
            course_name: course_code.to_string(),
            subject: Some(subject.to_string()),
            core_required: false,
            active: true,
            teacher_id: None,
            room_id: None,
            current_enrollment: 0,
            max_students: None,
            required_room_type: None,
            requires_lab: false,
            revision: 0,
        }
    }

    /// 归一化后的学科 (小写 + trim); 空学科返回 None
    pub fn normalized_subject(&self) -> Option<String> {
        self.subject
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
    }
}

// ==========================================
// Room - 教室
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub room_id: i64,
    pub room_number: String,
    pub room_type: RoomType,
    pub capacity: i32,
    pub building: Option<String>,
    pub active: bool,
}

impl Room {
    pub fn new(room_id: i64, room_number: &str, room_type: RoomType, capacity: i32) -> Self {
        Self {
            room_id,
            room_number: room_number.to_string(),
            room_type,
            capacity,
            building: None,
            active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_subject() {
        let mut course = Course::new(1, "CHEM-101", "  Chemistry ");
        assert_eq!(course.normalized_subject().as_deref(), Some("chemistry"));

        course.subject = Some("   ".to_string());
        assert!(course.normalized_subject().is_none());

        course.subject = None;
        assert!(course.normalized_subject().is_none());
    }
}
