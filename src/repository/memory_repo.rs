// ==========================================
// 排课分配引擎 - 内存数据仓储
// ==========================================
// 职责: 以内存快照实现 SchoolDataPort (预演/单元测试)
// 说明: 与 SQLite 实现遵守同一乐观锁约定
// ==========================================

use crate::domain::{Course, Room, Teacher};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::school_port::SchoolDataPort;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Snapshot {
    teachers: BTreeMap<i64, Teacher>,
    courses: BTreeMap<i64, Course>,
    rooms: BTreeMap<i64, Room>,
}

/// 内存学校数据仓储
#[derive(Default)]
pub struct InMemorySchoolRepository {
    inner: Mutex<Snapshot>,
}

impl InMemorySchoolRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以现有快照构建
    pub fn with_data(teachers: Vec<Teacher>, courses: Vec<Course>, rooms: Vec<Room>) -> Self {
        let snapshot = Snapshot {
            teachers: teachers.into_iter().map(|t| (t.teacher_id, t)).collect(),
            courses: courses.into_iter().map(|c| (c.course_id, c)).collect(),
            rooms: rooms.into_iter().map(|r| (r.room_id, r)).collect(),
        };
        Self {
            inner: Mutex::new(snapshot),
        }
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Snapshot>> {
        self.inner
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert_teacher(&self, teacher: Teacher) -> RepositoryResult<()> {
        self.lock()?.teachers.insert(teacher.teacher_id, teacher);
        Ok(())
    }

    pub fn insert_course(&self, course: Course) -> RepositoryResult<()> {
        self.lock()?.courses.insert(course.course_id, course);
        Ok(())
    }

    pub fn insert_room(&self, room: Room) -> RepositoryResult<()> {
        self.lock()?.rooms.insert(room.room_id, room);
        Ok(())
    }
}

impl SchoolDataPort for InMemorySchoolRepository {
    fn active_teachers(&self) -> RepositoryResult<Vec<Teacher>> {
        Ok(self.lock()?.teachers.values().filter(|t| t.active).cloned().collect())
    }

    fn active_courses(&self) -> RepositoryResult<Vec<Course>> {
        Ok(self.lock()?.courses.values().filter(|c| c.active).cloned().collect())
    }

    fn active_rooms(&self) -> RepositoryResult<Vec<Room>> {
        Ok(self.lock()?.rooms.values().filter(|r| r.active).cloned().collect())
    }

    fn find_teacher(&self, teacher_id: i64) -> RepositoryResult<Option<Teacher>> {
        Ok(self.lock()?.teachers.get(&teacher_id).cloned())
    }

    fn find_course(&self, course_id: i64) -> RepositoryResult<Option<Course>> {
        Ok(self.lock()?.courses.get(&course_id).cloned())
    }

    fn find_room(&self, room_id: i64) -> RepositoryResult<Option<Room>> {
        Ok(self.lock()?.rooms.get(&room_id).cloned())
    }

    fn save_teacher(&self, teacher: &Teacher) -> RepositoryResult<Teacher> {
        let mut guard = self.lock()?;
        let stored = guard
            .teachers
            .get_mut(&teacher.teacher_id)
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "teacher".to_string(),
                id: teacher.teacher_id.to_string(),
            })?;
        if stored.revision != teacher.revision {
            return Err(RepositoryError::OptimisticLockFailure {
                entity: "teacher".to_string(),
                id: teacher.teacher_id,
                expected: teacher.revision,
                actual: stored.revision,
            });
        }
        let mut saved = teacher.clone();
        saved.revision += 1;
        *stored = saved.clone();
        Ok(saved)
    }

    fn save_course(&self, course: &Course) -> RepositoryResult<Course> {
        let mut guard = self.lock()?;
        let stored = guard
            .courses
            .get_mut(&course.course_id)
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "course".to_string(),
                id: course.course_id.to_string(),
            })?;
        if stored.revision != course.revision {
            return Err(RepositoryError::OptimisticLockFailure {
                entity: "course".to_string(),
                id: course.course_id,
                expected: course.revision,
                actual: stored.revision,
            });
        }
        let mut saved = course.clone();
        saved.revision += 1;
        *stored = saved.clone();
        Ok(saved)
    }
}
