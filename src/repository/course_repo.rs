// ==========================================
// 排课分配引擎 - 课程与教室数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 依据: 乐观锁 (revision 字段) 串行化同一课程的并发写入
// ==========================================

use crate::domain::{Course, Room, RoomType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

const COURSE_COLUMNS: &str = r#"
    course_id, course_code, course_name, subject, core_required, active,
    teacher_id, room_id, current_enrollment, max_students, required_room_type,
    requires_lab, revision
"#;

// ==========================================
// CourseRepository - 课程仓储
// ==========================================
pub struct CourseRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CourseRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增课程
    pub fn insert(&self, course: &Course) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            &format!(
                "INSERT INTO course ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                COURSE_COLUMNS
            ),
            params![
                course.course_id,
                course.course_code,
                course.course_name,
                course.subject,
                course.core_required,
                course.active,
                course.teacher_id,
                course.room_id,
                course.current_enrollment,
                course.max_students,
                course.required_room_type.map(|t| t.as_str()),
                course.requires_lab,
                course.revision,
            ],
        )?;
        Ok(())
    }

    /// 按 ID 查询课程
    pub fn find_by_id(&self, course_id: i64) -> RepositoryResult<Option<Course>> {
        let conn = self.get_conn()?;
        let course = conn
            .query_row(
                &format!("SELECT {} FROM course WHERE course_id = ?1", COURSE_COLUMNS),
                params![course_id],
                map_course_row,
            )
            .optional()?;
        Ok(course)
    }

    /// 查询所有在开课程 (按 course_id 升序)
    pub fn find_all_active(&self) -> RepositoryResult<Vec<Course>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM course WHERE active = 1 ORDER BY course_id",
            COURSE_COLUMNS
        ))?;
        let courses = stmt
            .query_map([], map_course_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(courses)
    }

    /// 带乐观锁的更新
    ///
    /// # 错误
    /// - `RepositoryError::OptimisticLockFailure`: revision 不匹配 (其他写入者已更新)
    /// - `RepositoryError::NotFound`: 记录不存在
    pub fn update_with_revision(&self, course: &Course) -> RepositoryResult<Course> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE course
               SET course_code = ?1, course_name = ?2, subject = ?3, core_required = ?4,
                   active = ?5, teacher_id = ?6, room_id = ?7, current_enrollment = ?8,
                   max_students = ?9, required_room_type = ?10, requires_lab = ?11,
                   revision = revision + 1
             WHERE course_id = ?12 AND revision = ?13
            "#,
            params![
                course.course_code,
                course.course_name,
                course.subject,
                course.core_required,
                course.active,
                course.teacher_id,
                course.room_id,
                course.current_enrollment,
                course.max_students,
                course.required_room_type.map(|t| t.as_str()),
                course.requires_lab,
                course.course_id,
                course.revision,
            ],
        )?;

        if affected == 0 {
            let actual: Option<i32> = conn
                .query_row(
                    "SELECT revision FROM course WHERE course_id = ?1",
                    params![course.course_id],
                    |row| row.get(0),
                )
                .optional()?;
            return Err(match actual {
                Some(actual) => RepositoryError::OptimisticLockFailure {
                    entity: "course".to_string(),
                    id: course.course_id,
                    expected: course.revision,
                    actual,
                },
                None => RepositoryError::NotFound {
                    entity: "course".to_string(),
                    id: course.course_id.to_string(),
                },
            });
        }

        let mut saved = course.clone();
        saved.revision += 1;
        Ok(saved)
    }
}

fn map_course_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Course> {
    let required_room_type: Option<String> = row.get(10)?;
    Ok(Course {
        course_id: row.get(0)?,
        course_code: row.get(1)?,
        course_name: row.get(2)?,
        subject: row.get(3)?,
        core_required: row.get(4)?,
        active: row.get(5)?,
        teacher_id: row.get(6)?,
        room_id: row.get(7)?,
        current_enrollment: row.get(8)?,
        max_students: row.get(9)?,
        required_room_type: required_room_type.as_deref().map(RoomType::from_str),
        requires_lab: row.get(11)?,
        revision: row.get(12)?,
    })
}

// ==========================================
// RoomRepository - 教室仓储
// ==========================================
pub struct RoomRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RoomRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, room: &Room) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO room (room_id, room_number, room_type, capacity, building, active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                room.room_id,
                room.room_number,
                room.room_type.as_str(),
                room.capacity,
                room.building,
                room.active,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, room_id: i64) -> RepositoryResult<Option<Room>> {
        let conn = self.get_conn()?;
        let room = conn
            .query_row(
                r#"
                SELECT room_id, room_number, room_type, capacity, building, active
                FROM room WHERE room_id = ?1
                "#,
                params![room_id],
                map_room_row,
            )
            .optional()?;
        Ok(room)
    }

    pub fn find_all_active(&self) -> RepositoryResult<Vec<Room>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT room_id, room_number, room_type, capacity, building, active
            FROM room WHERE active = 1 ORDER BY room_id
            "#,
        )?;
        let rooms = stmt
            .query_map([], map_room_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rooms)
    }
}

fn map_room_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Room> {
    Ok(Room {
        room_id: row.get(0)?,
        room_number: row.get(1)?,
        room_type: RoomType::from_str(&row.get::<_, String>(2)?),
        capacity: row.get(3)?,
        building: row.get(4)?,
        active: row.get(5)?,
    })
}
