// ==========================================
// 排课分配引擎 - SQLite 仓储聚合
// ==========================================
// 职责: 聚合教师/课程/教室仓储, 实现 SchoolDataPort
// 目标: 引擎构造时只注入一个端口对象
// ==========================================

use crate::domain::{Course, Room, Teacher};
use crate::repository::course_repo::{CourseRepository, RoomRepository};
use crate::repository::error::RepositoryResult;
use crate::repository::school_port::SchoolDataPort;
use crate::repository::teacher_repo::TeacherRepository;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// SQLite 学校数据仓储集合
#[derive(Clone)]
pub struct SchoolRepositories {
    /// 教师仓储
    pub teacher_repo: Arc<TeacherRepository>,
    /// 课程仓储
    pub course_repo: Arc<CourseRepository>,
    /// 教室仓储
    pub room_repo: Arc<RoomRepository>,
}

impl SchoolRepositories {
    pub fn new(
        teacher_repo: Arc<TeacherRepository>,
        course_repo: Arc<CourseRepository>,
        room_repo: Arc<RoomRepository>,
    ) -> Self {
        Self {
            teacher_repo,
            course_repo,
            room_repo,
        }
    }

    /// 三个仓储共享同一连接
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            teacher_repo: Arc::new(TeacherRepository::from_connection(conn.clone())),
            course_repo: Arc::new(CourseRepository::from_connection(conn.clone())),
            room_repo: Arc::new(RoomRepository::from_connection(conn)),
        }
    }
}

impl SchoolDataPort for SchoolRepositories {
    fn active_teachers(&self) -> RepositoryResult<Vec<Teacher>> {
        self.teacher_repo.find_all_active()
    }

    fn active_courses(&self) -> RepositoryResult<Vec<Course>> {
        self.course_repo.find_all_active()
    }

    fn active_rooms(&self) -> RepositoryResult<Vec<Room>> {
        self.room_repo.find_all_active()
    }

    fn find_teacher(&self, teacher_id: i64) -> RepositoryResult<Option<Teacher>> {
        self.teacher_repo.find_by_id(teacher_id)
    }

    fn find_course(&self, course_id: i64) -> RepositoryResult<Option<Course>> {
        self.course_repo.find_by_id(course_id)
    }

    fn find_room(&self, room_id: i64) -> RepositoryResult<Option<Room>> {
        self.room_repo.find_by_id(room_id)
    }

    fn save_teacher(&self, teacher: &Teacher) -> RepositoryResult<Teacher> {
        tracing::debug!(teacher_id = teacher.teacher_id, revision = teacher.revision, "保存教师");
        self.teacher_repo.update_with_revision(teacher)
    }

    fn save_course(&self, course: &Course) -> RepositoryResult<Course> {
        tracing::debug!(course_id = course.course_id, revision = course.revision, "保存课程");
        self.course_repo.update_with_revision(course)
    }
}
