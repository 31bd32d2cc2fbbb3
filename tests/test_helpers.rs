// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据落库等功能
// ==========================================

#![allow(dead_code)]

use course_assignment::db::{ensure_schema, open_sqlite_connection};
use course_assignment::domain::{Course, Room, Teacher};
use course_assignment::repository::SchoolRepositories;
use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接
pub fn open_shared(db_path: &str) -> Arc<Mutex<Connection>> {
    Arc::new(Mutex::new(open_sqlite_connection(db_path).unwrap()))
}

/// 创建临时库 + 仓储集合
pub fn setup_repos() -> (NamedTempFile, String, Arc<SchoolRepositories>) {
    let (temp_file, db_path) = create_test_db().unwrap();
    let repos = Arc::new(SchoolRepositories::from_connection(open_shared(&db_path)));
    (temp_file, db_path, repos)
}

/// 按外键顺序落库
///
/// 1. 教室
/// 2. 课程 (先不带 teacher_id)
/// 3. 教师已拥有但不在 courses 中的课程 → 以停开课程占位
/// 4. 教师 (含 teacher_course)
/// 5. 回填课程 teacher_id (revision 因此 +1)
pub fn seed(repos: &SchoolRepositories, teachers: &[Teacher], courses: &[Course], rooms: &[Room]) {
    for room in rooms {
        repos.room_repo.insert(room).unwrap();
    }

    for course in courses {
        let mut bare = course.clone();
        bare.teacher_id = None;
        repos.course_repo.insert(&bare).unwrap();
    }

    for teacher in teachers {
        for course_id in &teacher.course_ids {
            if repos.course_repo.find_by_id(*course_id).unwrap().is_some() {
                continue;
            }
            let mut placeholder =
                Course::new(*course_id, &format!("OWNED-{}", course_id), "Elective");
            placeholder.active = false;
            repos.course_repo.insert(&placeholder).unwrap();
        }
        repos.teacher_repo.insert(teacher).unwrap();
    }

    for course in courses.iter().filter(|c| c.teacher_id.is_some()) {
        let mut stored = repos.course_repo.find_by_id(course.course_id).unwrap().unwrap();
        stored.teacher_id = course.teacher_id;
        repos.course_repo.update_with_revision(&stored).unwrap();
    }
}
