// ==========================================
// 排课分配引擎 - 教师领域模型
// ==========================================
// 职责: 教师实体与学科证书
// 红线: 本子系统只读教师数据, 唯一例外是 course_ids (由批量分配维护)
// ==========================================

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ==========================================
// SubjectCertification - 结构化学科证书
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectCertification {
    pub subject: String,                  // 学科
    pub issuing_agency: Option<String>,   // 颁发机构
    pub issue_date: Option<NaiveDate>,    // 颁发日期
    pub expiration_date: Option<NaiveDate>, // 到期日 (None = 永久有效)
    pub active: bool,                     // 是否启用
}

impl SubjectCertification {
    /// 创建一个永久有效的证书
    pub fn new(subject: &str) -> Self {
        Self {
            subject: subject.to_string(),
            issuing_agency: None,
            issue_date: None,
            expiration_date: None,
            active: true,
        }
    }

    /// 设置到期日
    pub fn expiring_on(mut self, date: NaiveDate) -> Self {
        self.expiration_date = Some(date);
        self
    }

    /// 证书在 today 是否有效
    ///
    /// # 规则
    /// - active=false → 无效
    /// - 无到期日 → 有效
    /// - today <= expiration_date → 有效(到期当天仍有效)
    pub fn is_valid(&self, today: NaiveDate) -> bool {
        if !self.active {
            return false;
        }
        match self.expiration_date {
            None => true,
            Some(exp) => today <= exp,
        }
    }

    /// 是否已过期
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        matches!(self.expiration_date, Some(exp) if today > exp)
    }

    /// 是否在 lookahead_days 天内到期(仍有效但即将到期)
    pub fn is_expiring_within(&self, today: NaiveDate, lookahead_days: i64) -> bool {
        let Some(exp) = self.expiration_date else {
            return false;
        };
        if !self.active || exp < today || lookahead_days < 0 {
            return false;
        }
        // 窗口终点超出日期范围时视为覆盖全部未来日期
        match Duration::try_days(lookahead_days).and_then(|d| today.checked_add_signed(d)) {
            Some(window_end) => exp <= window_end,
            None => true,
        }
    }
}

// ==========================================
// Teacher - 教师
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    // ===== 主键 =====
    pub teacher_id: i64,
    pub name: String,

    // ===== 基础信息 =====
    pub department: Option<String>,       // 院系(自由文本)
    pub active: bool,
    pub max_hours_per_week: Option<i32>,  // 每周最大课时
    pub current_week_hours: Option<i32>,  // 本周已排课时

    // ===== 资格 =====
    pub course_ids: BTreeSet<i64>,                     // 已拥有的课程
    pub subject_certifications: Vec<SubjectCertification>, // 结构化证书
    pub certifications: Vec<String>,                   // 旧版自由文本证书

    // ===== 并发控制 =====
    pub revision: i32, // 乐观锁版本号
}

impl Teacher {
    /// 创建一个空白在职教师
    pub fn new(teacher_id: i64, name: &str) -> Self {
        Self {
            teacher_id,
            name: name.to_string(),
            department: None,
            active: true,
            max_hours_per_week: None,
            current_week_hours: None,
            course_ids: BTreeSet::new(),
            subject_certifications: Vec::new(),
            certifications: Vec::new(),
            revision: 0,
        }
    }

    /// 当前拥有的不同课程数
    pub fn course_count(&self) -> usize {
        self.course_ids.len()
    }

    /// 是否已拥有该课程
    pub fn owns_course(&self, course_id: i64) -> bool {
        self.course_ids.contains(&course_id)
    }
}
