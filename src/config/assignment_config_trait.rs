// ==========================================
// 排课分配引擎 - 分配配置读取 Trait
// ==========================================
// 职责: 定义推荐/批量分配所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// AssignmentConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait AssignmentConfigReader: Send + Sync {
    // ===== 证书配置 =====

    /// 证书即将到期的提前天数
    ///
    /// # 默认值
    /// - 90
    async fn get_expiring_lookahead_days(&self) -> ConfigResult<i64>;

    /// 证书即将到期的扣分
    ///
    /// # 默认值
    /// - 10
    async fn get_expiring_penalty(&self) -> ConfigResult<i32>;

    // ===== 工作量扣分 =====

    /// 各工作量分档的扣分 (Light, Normal, Overloaded)
    ///
    /// # 默认值
    /// - (5, 15, 50)
    async fn get_workload_penalties(&self) -> ConfigResult<(i32, i32, i32)>;

    // ===== 优先级配置 =====

    /// 非必修课判定为 Normal 的最低分
    ///
    /// # 默认值
    /// - 60
    async fn get_normal_priority_min_score(&self) -> ConfigResult<i32>;

    // ===== 教室匹配配置 =====

    /// 教室容量低于课程最大人数时的扣分
    ///
    /// # 默认值
    /// - 15
    async fn get_room_shortfall_penalty(&self) -> ConfigResult<i32>;

    /// 教室每承载一门其他课程的扣分
    ///
    /// # 默认值
    /// - 10
    async fn get_room_occupied_penalty(&self) -> ConfigResult<i32>;

    // ===== 课时配置 =====

    /// 周课时接近上限的告警比例
    ///
    /// # 默认值
    /// - 0.9
    async fn get_hours_warning_ratio(&self) -> ConfigResult<f64>;
}
