// ==========================================
// 排课分配引擎 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 分配决策支持 (推荐可人工审阅后再提交)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 分配参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AssignmentStatus, QualificationTier, RecommendationPriority, RoomType, ViolationSeverity,
    WorkloadLevel,
};

// 领域实体
pub use domain::{
    AssignmentOperation, AssignmentResult, ComplianceViolation, Course,
    CourseAssignmentRecommendation, Room, RoomAssignmentRecommendation, SubjectCertification,
    Teacher,
};

// 引擎
pub use engine::{
    AssignmentStatusDeriver, BulkAssignmentExecutor, ComplianceAuditor, QualificationResolver,
    RecommendationEngine, WorkloadClassifier,
};

// API
pub use api::AssignmentApi;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "排课分配引擎";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
