// ==========================================
// 排课分配引擎 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问端口及其 SQLite / 内存实现
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod course_repo;
pub mod error;
pub mod memory_repo;
pub mod school_port;
pub mod school_repositories;
pub mod teacher_repo;

// 重导出核心仓储
pub use course_repo::{CourseRepository, RoomRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use memory_repo::InMemorySchoolRepository;
pub use school_port::SchoolDataPort;
pub use school_repositories::SchoolRepositories;
pub use teacher_repo::TeacherRepository;
