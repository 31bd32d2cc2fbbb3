// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use course_assignment::config::{AssignmentConfigReader, ConfigResult};

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub expiring_lookahead_days: i64,
    pub expiring_penalty: i32,
    pub workload_penalties: (i32, i32, i32),
    pub normal_priority_min_score: i32,
    pub room_shortfall_penalty: i32,
    pub room_occupied_penalty: i32,
    pub hours_warning_ratio: f64,
}

impl MockConfig {
    /// 创建默认配置
    pub fn default() -> Self {
        Self {
            expiring_lookahead_days: 90,
            expiring_penalty: 10,
            workload_penalties: (5, 15, 50),
            normal_priority_min_score: 60,
            room_shortfall_penalty: 15,
            room_occupied_penalty: 10,
            hours_warning_ratio: 0.9,
        }
    }
}

#[async_trait]
impl AssignmentConfigReader for MockConfig {
    async fn get_expiring_lookahead_days(&self) -> ConfigResult<i64> {
        Ok(self.expiring_lookahead_days)
    }

    async fn get_expiring_penalty(&self) -> ConfigResult<i32> {
        Ok(self.expiring_penalty)
    }

    async fn get_workload_penalties(&self) -> ConfigResult<(i32, i32, i32)> {
        Ok(self.workload_penalties)
    }

    async fn get_normal_priority_min_score(&self) -> ConfigResult<i32> {
        Ok(self.normal_priority_min_score)
    }

    async fn get_room_shortfall_penalty(&self) -> ConfigResult<i32> {
        Ok(self.room_shortfall_penalty)
    }

    async fn get_room_occupied_penalty(&self) -> ConfigResult<i32> {
        Ok(self.room_occupied_penalty)
    }

    async fn get_hours_warning_ratio(&self) -> ConfigResult<f64> {
        Ok(self.hours_warning_ratio)
    }
}
