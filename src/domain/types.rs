// ==========================================
// 排课分配引擎 - 领域类型定义
// ==========================================
// 职责: 状态/等级/优先级等枚举的唯一定义源
// 红线: 展示层只消费这里的枚举,禁止自行做字符串匹配
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 分配状态 (Assignment Status)
// ==========================================
// 红线: 永不落库,总是由 teacher_id/room_id 派生
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Unassigned, // 教师与教室均未分配
    Partial,    // 仅分配其一
    Assigned,   // 教师与教室均已分配
}

impl AssignmentStatus {
    /// 展示用文案
    pub fn label(&self) -> &'static str {
        match self {
            AssignmentStatus::Unassigned => "Unassigned",
            AssignmentStatus::Partial => "Partially Assigned",
            AssignmentStatus::Assigned => "Fully Assigned",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentStatus::Unassigned => write!(f, "UNASSIGNED"),
            AssignmentStatus::Partial => write!(f, "PARTIAL"),
            AssignmentStatus::Assigned => write!(f, "ASSIGNED"),
        }
    }
}

// ==========================================
// 工作量分档 (Workload Level)
// ==========================================
// 顺序: Underutilized < Light < Normal < Overloaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkloadLevel {
    Underutilized, // 无课
    Light,         // 轻载
    Normal,        // 正常
    Overloaded,    // 超载
}

impl fmt::Display for WorkloadLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkloadLevel::Underutilized => write!(f, "UNDERUTILIZED"),
            WorkloadLevel::Light => write!(f, "LIGHT"),
            WorkloadLevel::Normal => write!(f, "NORMAL"),
            WorkloadLevel::Overloaded => write!(f, "OVERLOADED"),
        }
    }
}

// ==========================================
// 资格层级 (Qualification Tier)
// ==========================================
// 顺序即判定优先级: Explicit 最强, Department 最弱
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualificationTier {
    Explicit,   // 已拥有该课程(人工覆盖)
    Structured, // 结构化学科证书
    Legacy,     // 旧版自由文本证书
    Department, // 院系推断
}

impl QualificationTier {
    /// 推荐评分的基础分
    pub fn base_score(&self) -> i32 {
        match self {
            QualificationTier::Explicit => 100,
            QualificationTier::Structured => 80,
            QualificationTier::Legacy => 60,
            QualificationTier::Department => 40,
        }
    }
}

impl fmt::Display for QualificationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualificationTier::Explicit => write!(f, "EXPLICIT"),
            QualificationTier::Structured => write!(f, "STRUCTURED"),
            QualificationTier::Legacy => write!(f, "LEGACY"),
            QualificationTier::Department => write!(f, "DEPARTMENT"),
        }
    }
}

// ==========================================
// 推荐优先级 (Recommendation Priority)
// ==========================================
// 顺序: Critical 最高; 排序时按声明顺序升序即 Critical 在前
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationPriority {
    Critical,
    High,
    Normal,
    Low,
}

impl fmt::Display for RecommendationPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendationPriority::Critical => write!(f, "CRITICAL"),
            RecommendationPriority::High => write!(f, "HIGH"),
            RecommendationPriority::Normal => write!(f, "NORMAL"),
            RecommendationPriority::Low => write!(f, "LOW"),
        }
    }
}

// ==========================================
// 违规严重度 (Violation Severity)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationSeverity {
    High,   // 必修课
    Medium, // 选修课
}

impl fmt::Display for ViolationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationSeverity::High => write!(f, "HIGH"),
            ViolationSeverity::Medium => write!(f, "MEDIUM"),
        }
    }
}

// ==========================================
// 教室类型 (Room Type)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomType {
    Classroom,
    ScienceLab,
    StemLab,
    ComputerLab,
    Lab,
    Gymnasium,
    Auditorium,
    ArtStudio,
    MusicRoom,
    Library,
    Multipurpose,
    Other,
}

impl RoomType {
    /// 是否属于实验室族
    pub fn is_lab(&self) -> bool {
        matches!(
            self,
            RoomType::ScienceLab | RoomType::StemLab | RoomType::ComputerLab | RoomType::Lab
        )
    }

    /// 是否属于同一族(实验室族内可互相替代)
    pub fn same_family(&self, other: RoomType) -> bool {
        *self == other || (self.is_lab() && other.is_lab())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Classroom => "CLASSROOM",
            RoomType::ScienceLab => "SCIENCE_LAB",
            RoomType::StemLab => "STEM_LAB",
            RoomType::ComputerLab => "COMPUTER_LAB",
            RoomType::Lab => "LAB",
            RoomType::Gymnasium => "GYMNASIUM",
            RoomType::Auditorium => "AUDITORIUM",
            RoomType::ArtStudio => "ART_STUDIO",
            RoomType::MusicRoom => "MUSIC_ROOM",
            RoomType::Library => "LIBRARY",
            RoomType::Multipurpose => "MULTIPURPOSE",
            RoomType::Other => "OTHER",
        }
    }

    /// 从数据库字符串解析,未知值归为 Other
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "CLASSROOM" => RoomType::Classroom,
            "SCIENCE_LAB" => RoomType::ScienceLab,
            "STEM_LAB" => RoomType::StemLab,
            "COMPUTER_LAB" => RoomType::ComputerLab,
            "LAB" => RoomType::Lab,
            "GYMNASIUM" => RoomType::Gymnasium,
            "AUDITORIUM" => RoomType::Auditorium,
            "ART_STUDIO" => RoomType::ArtStudio,
            "MUSIC_ROOM" => RoomType::MusicRoom,
            "LIBRARY" => RoomType::Library,
            "MULTIPURPOSE" => RoomType::Multipurpose,
            _ => RoomType::Other,
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
