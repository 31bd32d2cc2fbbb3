// ==========================================
// 排课分配引擎 - API 层
// ==========================================
// 职责: 提供进程内业务 API, 供界面层 / 命令行调用
// ==========================================

pub mod assignment_api;
pub mod error;

// 重导出核心类型
pub use assignment_api::{
    today, AssignmentApi, AssignmentJobHandle, AssignmentStatusSummary, TeacherCandidateInfo,
};
pub use error::{ApiError, ApiResult};
