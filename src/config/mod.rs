// ==========================================
// 排课分配引擎 - 配置层
// ==========================================
// 职责: 分配参数管理,支持 config_kv 覆写
// 存储: config_kv 表
// ==========================================

pub mod assignment_config;
pub mod assignment_config_trait;
pub mod config_manager;

// 重导出核心配置管理器
pub use assignment_config::AssignmentConfig;
pub use assignment_config_trait::{AssignmentConfigReader, ConfigResult};
pub use config_manager::{config_keys, ConfigManager, MAX_EXPIRING_LOOKAHEAD_DAYS};
