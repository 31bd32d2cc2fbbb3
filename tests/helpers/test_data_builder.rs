// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::NaiveDate;
use course_assignment::domain::types::RoomType;
use course_assignment::domain::{Course, Room, SubjectCertification, Teacher};

// ==========================================
// Teacher 构建器
// ==========================================

pub struct TeacherBuilder {
    teacher: Teacher,
}

impl TeacherBuilder {
    pub fn new(teacher_id: i64) -> Self {
        Self {
            teacher: Teacher::new(teacher_id, &format!("Teacher {}", teacher_id)),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.teacher.name = name.to_string();
        self
    }

    pub fn department(mut self, department: &str) -> Self {
        self.teacher.department = Some(department.to_string());
        self
    }

    pub fn certified(mut self, subject: &str) -> Self {
        self.teacher
            .subject_certifications
            .push(SubjectCertification::new(subject));
        self
    }

    pub fn certified_until(mut self, subject: &str, expires: NaiveDate) -> Self {
        self.teacher
            .subject_certifications
            .push(SubjectCertification::new(subject).expiring_on(expires));
        self
    }

    pub fn legacy_certification(mut self, text: &str) -> Self {
        self.teacher.certifications.push(text.to_string());
        self
    }

    pub fn owns(mut self, course_ids: impl IntoIterator<Item = i64>) -> Self {
        self.teacher.course_ids.extend(course_ids);
        self
    }

    pub fn hours(mut self, current: i32, max: i32) -> Self {
        self.teacher.current_week_hours = Some(current);
        self.teacher.max_hours_per_week = Some(max);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.teacher.active = false;
        self
    }

    pub fn build(self) -> Teacher {
        self.teacher
    }
}

// ==========================================
// Course 构建器
// ==========================================

pub struct CourseBuilder {
    course: Course,
}

impl CourseBuilder {
    pub fn new(course_id: i64, subject: &str) -> Self {
        let code = format!("{}-{}", subject.to_uppercase(), course_id);
        Self {
            course: Course::new(course_id, &code, subject),
        }
    }

    pub fn core(mut self) -> Self {
        self.course.core_required = true;
        self
    }

    pub fn teacher(mut self, teacher_id: i64) -> Self {
        self.course.teacher_id = Some(teacher_id);
        self
    }

    pub fn room(mut self, room_id: i64) -> Self {
        self.course.room_id = Some(room_id);
        self
    }

    pub fn enrollment(mut self, current: i32, max: Option<i32>) -> Self {
        self.course.current_enrollment = current;
        self.course.max_students = max;
        self
    }

    pub fn room_type(mut self, room_type: RoomType) -> Self {
        self.course.required_room_type = Some(room_type);
        self
    }

    pub fn lab(mut self) -> Self {
        self.course.requires_lab = true;
        self
    }

    pub fn build(self) -> Course {
        self.course
    }
}

// ==========================================
// Room 构建器
// ==========================================

pub fn room(room_id: i64, room_type: RoomType, capacity: i32) -> Room {
    Room::new(room_id, &format!("R{}", room_id), room_type, capacity)
}

/// 测试统一使用的"今天"
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
}
