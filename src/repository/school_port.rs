// ==========================================
// 排课分配引擎 - 数据访问端口
// ==========================================
// 职责: 定义引擎所依赖的读写端口, 由持久化层实现
// 说明: 引擎只依赖 trait, 构造时显式注入 (不走全局容器)
// ==========================================

use crate::domain::{Course, Room, Teacher};
use crate::repository::error::RepositoryResult;

/// 学校数据端口
///
/// # 写入约定
/// - `save_course` / `save_teacher` 以传入对象的 `revision` 做乐观锁校验
/// - 校验失败返回 `RepositoryError::OptimisticLockFailure`
/// - 成功后返回 revision + 1 的新对象
pub trait SchoolDataPort: Send + Sync {
    /// 所有在职教师
    fn active_teachers(&self) -> RepositoryResult<Vec<Teacher>>;

    /// 所有在开课程
    fn active_courses(&self) -> RepositoryResult<Vec<Course>>;

    /// 所有可用教室
    fn active_rooms(&self) -> RepositoryResult<Vec<Room>>;

    fn find_teacher(&self, teacher_id: i64) -> RepositoryResult<Option<Teacher>>;

    fn find_course(&self, course_id: i64) -> RepositoryResult<Option<Course>>;

    fn find_room(&self, room_id: i64) -> RepositoryResult<Option<Room>>;

    /// 保存教师 (仅用于维护 course_ids)
    fn save_teacher(&self, teacher: &Teacher) -> RepositoryResult<Teacher>;

    /// 保存课程 (teacher_id / room_id 变更)
    fn save_course(&self, course: &Course) -> RepositoryResult<Course>;
}
