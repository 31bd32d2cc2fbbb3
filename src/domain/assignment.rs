// ==========================================
// 排课分配引擎 - 分配结果领域模型
// ==========================================
// 职责: 推荐、批量结果、合规违规等瞬态对象 (不落库)
// 红线: 单条业务失败写入 errors/warnings, 不抛异常
// ==========================================

use crate::domain::course::{Course, Room};
use crate::domain::teacher::Teacher;
use crate::domain::types::{QualificationTier, RecommendationPriority, ViolationSeverity};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

// ==========================================
// CourseAssignmentRecommendation - 教师推荐
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseAssignmentRecommendation {
    pub course: Course,
    pub current_teacher_id: Option<i64>,
    pub recommended_teacher: Option<Teacher>, // None = 无合格候选人
    pub tier: Option<QualificationTier>,      // 推荐人命中的资格层级
    pub match_score: i32,                     // 0-100
    pub priority: RecommendationPriority,
    pub reasoning: String,
    pub course_revision: i32, // 生成推荐时课程的版本号, 提交时用于过期校验
}

impl CourseAssignmentRecommendation {
    /// 是否存在可提交的候选人
    pub fn is_actionable(&self) -> bool {
        self.recommended_teacher.is_some()
    }
}

// ==========================================
// RoomAssignmentRecommendation - 教室推荐
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomAssignmentRecommendation {
    pub course: Course,
    pub current_room_id: Option<i64>,
    pub recommended_room: Option<Room>,
    pub match_score: i32,
    pub priority: RecommendationPriority,
    pub reasoning: String,
    pub course_revision: i32,
}

impl RoomAssignmentRecommendation {
    pub fn is_actionable(&self) -> bool {
        self.recommended_room.is_some()
    }
}

// ==========================================
// AssignmentOperation - 批量操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentOperation {
    AssignAllTeachers,
    AssignAllRooms,
    ApplyTeachers,
    ApplyRooms,
    ClearAll,
}

impl AssignmentOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentOperation::AssignAllTeachers => "ASSIGN_ALL_TEACHERS",
            AssignmentOperation::AssignAllRooms => "ASSIGN_ALL_ROOMS",
            AssignmentOperation::ApplyTeachers => "APPLY_TEACHERS",
            AssignmentOperation::ApplyRooms => "APPLY_ROOMS",
            AssignmentOperation::ClearAll => "CLEAR_ALL",
        }
    }
}

// ==========================================
// AssignmentResult - 批量分配结果
// ==========================================
// 说明: ClearAll 时 assigned 表示本次实际清空的课程数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentResult {
    pub job_id: String,
    pub operation: AssignmentOperation,

    // ===== 计数 =====
    pub total_processed: usize,
    pub assigned: usize,
    pub failed: usize,

    // ===== 明细 =====
    pub warnings: Vec<String>,
    pub errors: Vec<String>,

    // ===== 执行元数据 =====
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_ms: u64,
    pub is_simulation: bool,
    pub cancelled: bool,
}

impl AssignmentResult {
    pub fn new(job_id: &str, operation: AssignmentOperation) -> Self {
        Self {
            job_id: job_id.to_string(),
            operation,
            total_processed: 0,
            assigned: 0,
            failed: 0,
            warnings: Vec::new(),
            errors: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
            duration_ms: 0,
            is_simulation: false,
            cancelled: false,
        }
    }

    /// 记录一条成功
    pub fn record_success(&mut self) {
        self.total_processed += 1;
        self.assigned += 1;
    }

    /// 记录一条已处理但无需变更的条目 (如已清空的课程)
    pub fn record_unchanged(&mut self) {
        self.total_processed += 1;
    }

    /// 记录一条失败
    pub fn record_failure(&mut self, message: String) {
        self.total_processed += 1;
        self.failed += 1;
        self.errors.push(message);
    }

    pub fn add_warning(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// 结束计时
    pub fn finish(&mut self, started: Instant) {
        self.duration_ms = started.elapsed().as_millis() as u64;
        self.finished_at = Some(Utc::now());
    }

    /// 成功率 (0-100); 未处理任何条目时为 0
    pub fn success_rate(&self) -> f64 {
        if self.total_processed == 0 {
            return 0.0;
        }
        self.assigned as f64 * 100.0 / self.total_processed as f64
    }
}

// ==========================================
// ComplianceViolation - 合规违规
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceViolation {
    pub course: Course,
    pub current_teacher: Teacher,
    pub qualified_alternatives: Vec<Teacher>,
    pub auto_correct_available: bool,
    pub severity: ViolationSeverity,
    pub description: String,
    pub proposed_correction: Option<CourseAssignmentRecommendation>,
}

// ==========================================
// ExpiringCertificationNotice - 证书到期提醒
// ==========================================
// 资格仍成立, 但结构化证书即将到期
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpiringCertificationNotice {
    pub teacher_id: i64,
    pub teacher_name: String,
    pub subject: String,
    pub expiration_date: NaiveDate,
    pub days_remaining: i64,
}

// ==========================================
// AssignmentValidation - 单条分配校验结果
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentValidation {
    pub issues: Vec<String>,   // 阻断性问题
    pub warnings: Vec<String>, // 提示
}

impl AssignmentValidation {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}
