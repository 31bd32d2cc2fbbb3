// ==========================================
// 排课分配引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型与瞬态结果对象
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod assignment;
pub mod course;
pub mod teacher;
pub mod types;

// 重导出核心类型
pub use assignment::{
    AssignmentOperation, AssignmentResult, AssignmentValidation, ComplianceViolation,
    CourseAssignmentRecommendation, ExpiringCertificationNotice, RoomAssignmentRecommendation,
};
pub use course::{Course, Room};
pub use teacher::{SubjectCertification, Teacher};
pub use types::{
    AssignmentStatus, QualificationTier, RecommendationPriority, RoomType, ViolationSeverity,
    WorkloadLevel,
};
