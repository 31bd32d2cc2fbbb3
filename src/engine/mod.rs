// ==========================================
// 排课分配引擎 - 引擎层
// ==========================================
// 职责: 实现资格判定、推荐、审计与批量分配规则
// 红线: Engine 不拼 SQL, 只依赖 SchoolDataPort
// 红线: 所有判定必须输出可读原因
// ==========================================

pub mod assignment_status;
pub mod bulk_assignment;
pub mod compliance;
pub mod error;
pub mod events;
pub mod job_control;
pub mod qualification;
pub mod recommendation;
pub mod workload;

// 重导出核心引擎
pub use assignment_status::AssignmentStatusDeriver;
pub use bulk_assignment::{
    BulkAssignmentExecutor, INSUFFICIENT_ROOM_CAPACITY, NO_COMPATIBLE_ROOM, NO_QUALIFIED_TEACHER,
    STALE_ASSIGNMENT,
};
pub use compliance::ComplianceAuditor;
pub use error::{EngineError, EngineResult};
pub use events::{
    AssignmentProgress, AssignmentProgressSink, ChannelProgressSink, ItemOutcome,
    NoOpProgressSink, OptionalProgressSink,
};
pub use job_control::{AssignmentJobRegistry, CancellationFlag, JobGuard};
pub use qualification::{QualificationResolver, DEFAULT_EXPIRING_LOOKAHEAD_DAYS};
pub use recommendation::{RecommendationEngine, RoomCandidate, TeacherCandidate};
pub use workload::{
    WorkloadClassifier, LIGHT_MIN_COURSES, NORMAL_MIN_COURSES, OVERLOADED_MIN_COURSES,
};
