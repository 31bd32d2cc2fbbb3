// ==========================================
// 排课分配引擎 - 分配参数快照
// ==========================================
// 职责: 一次性读取配置, 供纯函数引擎同步使用
// ==========================================

use crate::config::assignment_config_trait::{AssignmentConfigReader, ConfigResult};
use serde::{Deserialize, Serialize};

/// 分配参数 (引擎只读)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentConfig {
    /// 证书即将到期提前天数
    pub expiring_lookahead_days: i64,
    /// 证书即将到期扣分
    pub expiring_penalty: i32,
    /// Light 档扣分
    pub light_load_penalty: i32,
    /// Normal 档扣分
    pub normal_load_penalty: i32,
    /// Overloaded 档扣分
    pub overloaded_penalty: i32,
    /// 非必修课 Normal 优先级最低分
    pub normal_priority_min_score: i32,
    /// 教室容量不足最大人数扣分
    pub room_shortfall_penalty: i32,
    /// 教室已被占用扣分 (每门)
    pub room_occupied_penalty: i32,
    /// 周课时告警比例
    pub hours_warning_ratio: f64,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            expiring_lookahead_days: 90,
            expiring_penalty: 10,
            light_load_penalty: 5,
            normal_load_penalty: 15,
            overloaded_penalty: 50,
            normal_priority_min_score: 60,
            room_shortfall_penalty: 15,
            room_occupied_penalty: 10,
            hours_warning_ratio: 0.9,
        }
    }
}

impl AssignmentConfig {
    /// 从配置读取器加载
    pub async fn load(reader: &dyn AssignmentConfigReader) -> ConfigResult<Self> {
        let (light, normal, overloaded) = reader.get_workload_penalties().await?;
        Ok(Self {
            expiring_lookahead_days: reader.get_expiring_lookahead_days().await?,
            expiring_penalty: reader.get_expiring_penalty().await?,
            light_load_penalty: light,
            normal_load_penalty: normal,
            overloaded_penalty: overloaded,
            normal_priority_min_score: reader.get_normal_priority_min_score().await?,
            room_shortfall_penalty: reader.get_room_shortfall_penalty().await?,
            room_occupied_penalty: reader.get_room_occupied_penalty().await?,
            hours_warning_ratio: reader.get_hours_warning_ratio().await?,
        })
    }
}
