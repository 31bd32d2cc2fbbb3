// ==========================================
// 排课分配引擎 - 批量分配执行器
// ==========================================
// 职责: AssignAll / Apply / ClearAll / 预演
// 红线: 每条在提交时复核, 过期即失败, 不静默覆盖
// 红线: 单条失败不中止整批; 基础设施错误中止, 已提交条目保留
// ==========================================

mod clear;
mod core;
mod preview;
mod room_pass;
mod teacher_pass;


pub use self::core::{
    BulkAssignmentExecutor, INSUFFICIENT_ROOM_CAPACITY, NO_COMPATIBLE_ROOM, NO_QUALIFIED_TEACHER,
    STALE_ASSIGNMENT,
};
