// ==========================================
// 排课分配引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::assignment_config_trait::{AssignmentConfigReader, ConfigResult};
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// 到期预警窗口上限 (天)
pub const MAX_EXPIRING_LOOKAHEAD_DAYS: i64 = 3650;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 读取并解析数值配置; 格式错误时告警并回退默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: std::str::FromStr + std::fmt::Display + Copy,
    {
        let raw = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };
        match raw.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = %default,
                    "配置值格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }

    /// 同 get_parsed_or_default, 超出 [min, max] 时同样回退默认值
    fn get_ranged_or_default<T>(&self, key: &str, default: T, min: T, max: T) -> ConfigResult<T>
    where
        T: std::str::FromStr + std::fmt::Display + Copy + PartialOrd,
    {
        let value = self.get_parsed_or_default(key, default)?;
        if value < min || value > max {
            tracing::warn!(
                config_key = key,
                value = %value,
                min = %min,
                max = %max,
                default = %default,
                "配置值超出范围，使用默认值"
            );
            return Ok(default);
        }
        Ok(value)
    }

    /// 写入 global scope 配置 (UPSERT)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 启动时写入日志, 便于核对生效的覆写
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key"
        )?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
            ))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }
}

// ==========================================
// AssignmentConfigReader Trait 实现
// ==========================================
#[async_trait]
impl AssignmentConfigReader for ConfigManager {
    async fn get_expiring_lookahead_days(&self) -> ConfigResult<i64> {
        self.get_ranged_or_default(
            config_keys::EXPIRING_LOOKAHEAD_DAYS,
            90,
            0,
            MAX_EXPIRING_LOOKAHEAD_DAYS,
        )
    }

    async fn get_expiring_penalty(&self) -> ConfigResult<i32> {
        self.get_parsed_or_default(config_keys::EXPIRING_PENALTY, 10)
    }

    async fn get_workload_penalties(&self) -> ConfigResult<(i32, i32, i32)> {
        // 格式: "light,normal,overloaded"
        let value = self.get_config_or_default(config_keys::WORKLOAD_PENALTIES, "5,15,50")?;
        let parts: Vec<i32> = value
            .split(',')
            .filter_map(|s| s.trim().parse::<i32>().ok())
            .collect();

        if parts.len() == 3 {
            Ok((parts[0], parts[1], parts[2]))
        } else {
            tracing::warn!(
                config_key = config_keys::WORKLOAD_PENALTIES,
                raw_value = %value,
                "工作量扣分配置格式错误，使用默认值"
            );
            Ok((5, 15, 50))
        }
    }

    async fn get_normal_priority_min_score(&self) -> ConfigResult<i32> {
        self.get_parsed_or_default(config_keys::NORMAL_PRIORITY_MIN_SCORE, 60)
    }

    async fn get_room_shortfall_penalty(&self) -> ConfigResult<i32> {
        self.get_parsed_or_default(config_keys::ROOM_SHORTFALL_PENALTY, 15)
    }

    async fn get_room_occupied_penalty(&self) -> ConfigResult<i32> {
        self.get_parsed_or_default(config_keys::ROOM_OCCUPIED_PENALTY, 10)
    }

    async fn get_hours_warning_ratio(&self) -> ConfigResult<f64> {
        self.get_parsed_or_default(config_keys::HOURS_WARNING_RATIO, 0.9)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 证书
    pub const EXPIRING_LOOKAHEAD_DAYS: &str = "expiring_lookahead_days";
    pub const EXPIRING_PENALTY: &str = "expiring_penalty";

    // 工作量
    pub const WORKLOAD_PENALTIES: &str = "workload_penalties";

    // 优先级
    pub const NORMAL_PRIORITY_MIN_SCORE: &str = "normal_priority_min_score";

    // 教室
    pub const ROOM_SHORTFALL_PENALTY: &str = "room_shortfall_penalty";
    pub const ROOM_OCCUPIED_PENALTY: &str = "room_occupied_penalty";

    // 课时
    pub const HOURS_WARNING_RATIO: &str = "hours_warning_ratio";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssignmentConfig;

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_table_empty() {
        let manager = setup();
        let config = AssignmentConfig::load(&manager).await.unwrap();
        assert_eq!(config, AssignmentConfig::default());
    }

    #[tokio::test]
    async fn test_overrides_and_malformed_values() {
        let manager = setup();
        manager
            .set_global_config_value(config_keys::EXPIRING_LOOKAHEAD_DAYS, "30")
            .unwrap();
        manager
            .set_global_config_value(config_keys::WORKLOAD_PENALTIES, "1,2")
            .unwrap();
        manager
            .set_global_config_value(config_keys::NORMAL_PRIORITY_MIN_SCORE, "abc")
            .unwrap();

        let config = AssignmentConfig::load(&manager).await.unwrap();
        assert_eq!(config.expiring_lookahead_days, 30);
        assert_eq!(config.light_load_penalty, 5);
        assert_eq!(config.overloaded_penalty, 50);
        assert_eq!(config.normal_priority_min_score, 60);
    }

    #[tokio::test]
    async fn test_lookahead_out_of_range_falls_back() {
        let manager = setup();
        for raw in ["100000000", "-1", "9223372036854775807"] {
            manager
                .set_global_config_value(config_keys::EXPIRING_LOOKAHEAD_DAYS, raw)
                .unwrap();
            assert_eq!(manager.get_expiring_lookahead_days().await.unwrap(), 90, "{}", raw);
        }

        manager
            .set_global_config_value(config_keys::EXPIRING_LOOKAHEAD_DAYS, "3650")
            .unwrap();
        assert_eq!(manager.get_expiring_lookahead_days().await.unwrap(), 3650);
    }

    #[test]
    fn test_config_snapshot_contains_keys() {
        let manager = setup();
        manager
            .set_global_config_value(config_keys::EXPIRING_PENALTY, "12")
            .unwrap();
        let snapshot = manager.get_config_snapshot().unwrap();
        assert!(snapshot.contains("expiring_penalty"));
        assert!(snapshot.contains("12"));
    }
}
