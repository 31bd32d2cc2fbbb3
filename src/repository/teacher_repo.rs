// ==========================================
// 排课分配引擎 - 教师数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::{SubjectCertification, Teacher};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

const DATE_FMT: &str = "%Y-%m-%d";

// ==========================================
// TeacherRepository - 教师仓储
// ==========================================

/// 教师仓储
/// 职责: 管理 teacher / subject_certification / teacher_course 三张表
pub struct TeacherRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TeacherRepository {
    /// 创建新的教师仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增教师 (含证书与已拥有课程)
    pub fn insert(&self, teacher: &Teacher) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO teacher (
                teacher_id, name, department, active, max_hours_per_week,
                current_week_hours, certifications_json, revision
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                teacher.teacher_id,
                teacher.name,
                teacher.department,
                teacher.active,
                teacher.max_hours_per_week,
                teacher.current_week_hours,
                serde_json::to_string(&teacher.certifications)?,
                teacher.revision,
            ],
        )?;

        for cert in &teacher.subject_certifications {
            tx.execute(
                r#"
                INSERT INTO subject_certification (
                    teacher_id, subject, issuing_agency, issue_date, expiration_date, active
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    teacher.teacher_id,
                    cert.subject,
                    cert.issuing_agency,
                    cert.issue_date.map(|d| d.format(DATE_FMT).to_string()),
                    cert.expiration_date.map(|d| d.format(DATE_FMT).to_string()),
                    cert.active,
                ],
            )?;
        }

        Self::write_course_ids(&tx, teacher.teacher_id, &teacher.course_ids)?;
        tx.commit()?;
        Ok(())
    }

    /// 按 ID 查询教师
    pub fn find_by_id(&self, teacher_id: i64) -> RepositoryResult<Option<Teacher>> {
        let conn = self.get_conn()?;
        let teacher = conn
            .query_row(
                r#"
                SELECT teacher_id, name, department, active, max_hours_per_week,
                       current_week_hours, certifications_json, revision
                FROM teacher
                WHERE teacher_id = ?1
                "#,
                params![teacher_id],
                Self::map_row,
            )
            .optional()?;

        match teacher {
            Some(t) => Ok(Some(Self::load_details(&conn, t?)?)),
            None => Ok(None),
        }
    }

    /// 查询所有在职教师 (按 teacher_id 升序)
    pub fn find_all_active(&self) -> RepositoryResult<Vec<Teacher>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT teacher_id, name, department, active, max_hours_per_week,
                   current_week_hours, certifications_json, revision
            FROM teacher
            WHERE active = 1
            ORDER BY teacher_id
            "#,
        )?;

        let rows = stmt.query_map([], Self::map_row)?;
        let mut teachers = Vec::new();
        for row in rows {
            let teacher = row??;
            teachers.push(Self::load_details(&conn, teacher)?);
        }
        Ok(teachers)
    }

    /// 带乐观锁的更新
    ///
    /// 只回写基础字段与 teacher_course; 证书由外部 CRUD 维护
    ///
    /// # 错误
    /// - `RepositoryError::OptimisticLockFailure`: revision 不匹配
    /// - `RepositoryError::NotFound`: 记录不存在
    pub fn update_with_revision(&self, teacher: &Teacher) -> RepositoryResult<Teacher> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let affected = tx.execute(
            r#"
            UPDATE teacher
               SET name = ?1, department = ?2, active = ?3, max_hours_per_week = ?4,
                   current_week_hours = ?5, revision = revision + 1
             WHERE teacher_id = ?6 AND revision = ?7
            "#,
            params![
                teacher.name,
                teacher.department,
                teacher.active,
                teacher.max_hours_per_week,
                teacher.current_week_hours,
                teacher.teacher_id,
                teacher.revision,
            ],
        )?;

        if affected == 0 {
            // 判断是记录不存在还是 revision 冲突
            let actual: Option<i32> = tx
                .query_row(
                    "SELECT revision FROM teacher WHERE teacher_id = ?1",
                    params![teacher.teacher_id],
                    |row| row.get(0),
                )
                .optional()?;
            return Err(match actual {
                Some(actual) => RepositoryError::OptimisticLockFailure {
                    entity: "teacher".to_string(),
                    id: teacher.teacher_id,
                    expected: teacher.revision,
                    actual,
                },
                None => RepositoryError::NotFound {
                    entity: "teacher".to_string(),
                    id: teacher.teacher_id.to_string(),
                },
            });
        }

        tx.execute(
            "DELETE FROM teacher_course WHERE teacher_id = ?1",
            params![teacher.teacher_id],
        )?;
        Self::write_course_ids(&tx, teacher.teacher_id, &teacher.course_ids)?;
        tx.commit()?;

        let mut saved = teacher.clone();
        saved.revision += 1;
        Ok(saved)
    }

    fn write_course_ids(
        conn: &Connection,
        teacher_id: i64,
        course_ids: &BTreeSet<i64>,
    ) -> RepositoryResult<()> {
        let mut stmt =
            conn.prepare("INSERT OR IGNORE INTO teacher_course (teacher_id, course_id) VALUES (?1, ?2)")?;
        for course_id in course_ids {
            stmt.execute(params![teacher_id, course_id])?;
        }
        Ok(())
    }

    /// 行映射; 旧版证书 JSON 解析失败时返回内层错误
    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RepositoryResult<Teacher>> {
        let certifications_json: String = row.get(6)?;
        let mut teacher = Teacher::new(row.get(0)?, &row.get::<_, String>(1)?);
        teacher.department = row.get(2)?;
        teacher.active = row.get(3)?;
        teacher.max_hours_per_week = row.get(4)?;
        teacher.current_week_hours = row.get(5)?;
        teacher.revision = row.get(7)?;

        Ok(serde_json::from_str::<Vec<String>>(&certifications_json)
            .map(|certs| {
                teacher.certifications = certs;
                teacher
            })
            .map_err(RepositoryError::from))
    }

    fn load_details(conn: &Connection, mut teacher: Teacher) -> RepositoryResult<Teacher> {
        let mut stmt = conn.prepare(
            r#"
            SELECT subject, issuing_agency, issue_date, expiration_date, active
            FROM subject_certification
            WHERE teacher_id = ?1
            ORDER BY certification_id
            "#,
        )?;
        let rows = stmt.query_map(params![teacher.teacher_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, bool>(4)?,
            ))
        })?;
        let mut certs = Vec::new();
        for row in rows {
            let (subject, issuing_agency, issue_date, expiration_date, active) = row?;
            certs.push(SubjectCertification {
                subject,
                issuing_agency,
                issue_date: parse_date("issue_date", issue_date)?,
                expiration_date: parse_date("expiration_date", expiration_date)?,
                active,
            });
        }
        teacher.subject_certifications = certs;

        let mut stmt = conn.prepare(
            "SELECT course_id FROM teacher_course WHERE teacher_id = ?1 ORDER BY course_id",
        )?;
        let ids = stmt.query_map(params![teacher.teacher_id], |row| row.get::<_, i64>(0))?;
        teacher.course_ids = ids.collect::<Result<BTreeSet<_>, _>>()?;

        Ok(teacher)
    }
}

/// 无法解析的日期报错, 不当作"未设置"
fn parse_date(field: &str, raw: Option<String>) -> RepositoryResult<Option<NaiveDate>> {
    let Some(text) = raw else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(&text, DATE_FMT)
        .map(Some)
        .map_err(|e| RepositoryError::FieldValueError {
            field: field.to_string(),
            message: format!("'{}': {}", text, e),
        })
}
