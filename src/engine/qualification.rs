// ==========================================
// 排课分配引擎 - 任教资格判定 (纯函数库)
// ==========================================
// 职责: 判定教师能否任教课程, 并给出命中的资格层级
// 红线: 无状态、无副作用、无 I/O 操作; 缺失输入一律判否
// ==========================================

use crate::domain::{AssignmentValidation, Course, SubjectCertification, Teacher};
use crate::domain::types::QualificationTier;
use chrono::NaiveDate;

/// 证书即将到期的默认提前天数
pub const DEFAULT_EXPIRING_LOOKAHEAD_DAYS: i64 = 90;

// ==========================================
// QualificationResolver - 纯函数工具类
// ==========================================
pub struct QualificationResolver;

impl QualificationResolver {
    /// 判定任教资格
    ///
    /// # 规则 - 4层判定顺序 (命中即返回)
    /// 1. 课程已在教师 course_ids 中 → Explicit (人工覆盖)
    /// 2. 有效结构化证书, 学科 trim + 忽略大小写后完全相等 → Structured
    /// 3. 旧版证书文本 (小写) 包含课程学科 → Legacy
    /// 4. 院系与学科互为子串 → Department
    ///
    /// # 返回
    /// - (Option<QualificationTier>, Vec<String>): 命中层级 + 决策原因
    pub fn resolve(
        teacher: &Teacher,
        course: &Course,
        today: NaiveDate,
    ) -> (Option<QualificationTier>, Vec<String>) {
        let mut reasons = Vec::new();

        // 规则 1: 人工指定优先
        if teacher.owns_course(course.course_id) {
            reasons.push(format!(
                "EXPLICIT: course {} already owned by teacher {}",
                course.course_code, teacher.teacher_id
            ));
            return (Some(QualificationTier::Explicit), reasons);
        }

        let Some(subject) = course.normalized_subject() else {
            reasons.push(format!("NONE: course {} has no subject", course.course_code));
            return (None, reasons);
        };

        match Self::subject_tier(teacher, &subject, today) {
            Some((tier, reason)) => {
                reasons.push(reason);
                (Some(tier), reasons)
            }
            None => {
                reasons.push(format!(
                    "NONE: teacher {} has no certification or department match for '{}'",
                    teacher.teacher_id, subject
                ));
                (None, reasons)
            }
        }
    }

    /// 命中的资格层级
    pub fn qualification_tier(
        teacher: &Teacher,
        course: &Course,
        today: NaiveDate,
    ) -> Option<QualificationTier> {
        Self::resolve(teacher, course, today).0
    }

    /// 是否具备任教资格
    pub fn is_qualified(teacher: &Teacher, course: &Course, today: NaiveDate) -> bool {
        Self::qualification_tier(teacher, course, today).is_some()
    }

    /// 规则 2-4: 仅按学科判定 (不看课程归属)
    ///
    /// # 参数
    /// - subject: 已归一化 (小写 + trim) 的非空学科
    fn subject_tier(
        teacher: &Teacher,
        subject: &str,
        today: NaiveDate,
    ) -> Option<(QualificationTier, String)> {
        // 规则 2: 结构化证书
        if let Some(cert) = teacher
            .subject_certifications
            .iter()
            .find(|c| c.is_valid(today) && c.subject.trim().to_lowercase() == subject)
        {
            return Some((
                QualificationTier::Structured,
                format!("STRUCTURED: valid certification '{}'", cert.subject),
            ));
        }

        // 规则 3: 旧版自由文本证书, 方向为 证书 ⊇ 学科
        if let Some(cert) = teacher
            .certifications
            .iter()
            .find(|c| c.trim().to_lowercase().contains(subject))
        {
            return Some((
                QualificationTier::Legacy,
                format!("LEGACY: certification '{}' contains '{}'", cert, subject),
            ));
        }

        // 规则 4: 院系推断 (双向子串, 最弱信号)
        let department = teacher
            .department
            .as_deref()
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty())?;
        if department.contains(subject) || subject.contains(department.as_str()) {
            return Some((
                QualificationTier::Department,
                format!("DEPARTMENT: department '{}' matches subject '{}'", department, subject),
            ));
        }

        None
    }

    /// 可报告的已认证学科 (规则 2 的有效证书 ∪ 规则 3 的旧版证书)
    pub fn certified_subjects(teacher: &Teacher, today: NaiveDate) -> Vec<String> {
        let mut subjects: Vec<String> = Vec::new();

        let structured = teacher
            .subject_certifications
            .iter()
            .filter(|c| c.is_valid(today))
            .map(|c| c.subject.trim());
        let legacy = teacher.certifications.iter().map(|c| c.trim());

        for subject in structured.chain(legacy) {
            if !subject.is_empty() && !subjects.iter().any(|s| s == subject) {
                subjects.push(subject.to_string());
            }
        }
        subjects
    }

    /// 是否存在 lookahead_days 内到期的结构化证书
    ///
    /// 不改变 is_qualified 的结果, 只把资格降为“即将到期”
    pub fn has_expiring_certifications(
        teacher: &Teacher,
        today: NaiveDate,
        lookahead_days: i64,
    ) -> bool {
        !Self::expiring_certifications(teacher, today, lookahead_days).is_empty()
    }

    pub fn expiring_certifications(
        teacher: &Teacher,
        today: NaiveDate,
        lookahead_days: i64,
    ) -> Vec<&SubjectCertification> {
        teacher
            .subject_certifications
            .iter()
            .filter(|c| c.is_expiring_within(today, lookahead_days))
            .collect()
    }

    /// 教师可任教的在开课程
    pub fn eligible_courses<'a>(
        teacher: &Teacher,
        courses: &'a [Course],
        today: NaiveDate,
    ) -> Vec<&'a Course> {
        if !teacher.active {
            return Vec::new();
        }
        courses
            .iter()
            .filter(|c| c.active && Self::is_qualified(teacher, c, today))
            .collect()
    }

    /// 按学科查找具备资格的在职教师 (规则 2-4)
    pub fn teachers_certified_for<'a>(
        subject: &str,
        teachers: &'a [Teacher],
        today: NaiveDate,
    ) -> Vec<&'a Teacher> {
        let subject = subject.trim().to_lowercase();
        if subject.is_empty() {
            return Vec::new();
        }
        teachers
            .iter()
            .filter(|t| t.active && Self::subject_tier(t, &subject, today).is_some())
            .collect()
    }

    /// 校验单条分配
    ///
    /// # 规则
    /// - 教师/课程停用 → issue
    /// - 周课时已达上限 → issue; 达到 warning_ratio → warning
    /// - 无任教资格 → warning (由人工决定是否坚持)
    pub fn validate_assignment(
        teacher: &Teacher,
        course: &Course,
        today: NaiveDate,
        hours_warning_ratio: f64,
    ) -> AssignmentValidation {
        let mut validation = AssignmentValidation::default();

        if !teacher.active {
            validation.issues.push("Teacher is not active".to_string());
        }
        if !course.active {
            validation.issues.push("Course is not active".to_string());
        }

        if !Self::is_qualified(teacher, course, today) {
            validation.warnings.push(format!(
                "Teacher is not certified for subject: {}",
                course.subject.as_deref().unwrap_or("(none)")
            ));
        }

        let hours = (teacher.max_hours_per_week, teacher.current_week_hours);
        if let (Some(max), Some(current)) = hours {
            if current >= max {
                validation
                    .issues
                    .push(format!("Teacher has reached maximum weekly hours ({})", max));
            } else if current as f64 >= max as f64 * hours_warning_ratio {
                validation
                    .warnings
                    .push("Teacher is approaching maximum weekly hours".to_string());
            }
        }

        validation
    }
}
