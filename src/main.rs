// ==========================================
// 排课分配引擎 - 命令行入口
// ==========================================
// 用法:
//   course-assignment <command> [scope]
//
// 命令:
//   init               建表 (幂等), 输出 JSON 确认
//   recommend          教师推荐
//   rooms              教室推荐
//   audit              合规审计
//   expiring           即将到期的证书
//   status             分配状态统计
//   preview            模拟 AssignAll (不落库)
//   assign-all         批量分配教师
//   assign-rooms       批量分配教室
//   apply-corrections  提交审计纠正建议
//   clear-all          清空全部分配
//
// 数据库路径: COURSE_ASSIGNMENT_DB_PATH 环境变量, 否则使用用户数据目录
// 输出: stdout 为 JSON, 日志写 stderr
// ==========================================

use anyhow::{bail, Context};
use course_assignment::api::{today, ApiResult, AssignmentApi};
use course_assignment::config::ConfigManager;
use course_assignment::db::{ensure_schema, open_sqlite_connection};
use course_assignment::logging;
use course_assignment::AssignmentResult;
use course_assignment::repository::SchoolRepositories;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// 批量命令的默认 scope
const DEFAULT_SCOPE: &str = "default";

fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "status".to_string());
    let scope = args
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SCOPE.to_string());

    let db_path = get_default_db_path();
    tracing::info!(db_path = %db_path, command = %command, "启动排课分配引擎");

    let conn = open_sqlite_connection(&db_path)
        .with_context(|| format!("无法打开数据库: {}", db_path))?;
    ensure_schema(&conn).context("建表失败")?;
    if command == "init" {
        return print_json(&serde_json::json!({
            "schema_ready": true,
            "db_path": db_path,
        }));
    }
    let conn = Arc::new(Mutex::new(conn));

    let port = Arc::new(SchoolRepositories::from_connection(conn.clone()));
    let config_manager = ConfigManager::from_connection(conn)
        .map_err(|e| anyhow::anyhow!("配置管理器初始化失败: {}", e))?;
    match config_manager.get_config_snapshot() {
        Ok(snapshot) => tracing::info!(overrides = %snapshot, "配置覆写"),
        Err(e) => tracing::warn!(error = %e, "配置快照读取失败"),
    }

    let runtime = tokio::runtime::Runtime::new().context("无法创建 tokio 运行时")?;
    let api = runtime.block_on(AssignmentApi::from_config_reader(port, &config_manager))?;

    let day = today();
    match command.as_str() {
        "recommend" => print_json(&api.recommend_teachers(day)?),
        "rooms" => print_json(&api.recommend_rooms()?),
        "audit" => print_json(&api.audit(day)?),
        "expiring" => print_json(&api.expiring_certifications(day)?),
        "status" => print_json(&api.status_summary()?),
        "preview" => print_json(&api.preview_assign_all(day)?),
        "assign-all" => {
            // 后台运行, 前台消费进度事件
            let result: ApiResult<AssignmentResult> = runtime.block_on(async {
                let mut handle = api.spawn_assign_all(&scope, day)?;
                while let Some(event) = handle.progress.recv().await {
                    tracing::debug!(?event, "进度");
                }
                handle.wait().await
            });
            print_json(&result?)
        }
        "assign-rooms" => print_json(&api.assign_all_rooms(&scope)?),
        "apply-corrections" => print_json(&api.apply_corrections(&scope, day)?),
        "clear-all" => print_json(&api.clear_all(&scope)?),
        other => bail!("未知命令: {}", other),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// 获取默认数据库路径
pub fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("COURSE_ASSIGNMENT_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./course_assignment.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        let dir = data_dir.join("course-assignment-dev");

        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("course-assignment");

        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("course_assignment.db");
        }
    }

    path.to_string_lossy().to_string()
}
