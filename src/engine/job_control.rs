// ==========================================
// 排课分配引擎 - 批量任务并发控制
// ==========================================
// 职责: 同一 scope 同时只允许一个批量任务; 任务间协作式取消
// 说明: 进程内咨询锁, 由 RAII guard 释放
// ==========================================

use crate::engine::error::{EngineError, EngineResult};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

// ==========================================
// AssignmentJobRegistry - scope 级任务锁
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct AssignmentJobRegistry {
    running: Arc<Mutex<HashSet<String>>>,
}

impl AssignmentJobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 尝试占用 scope
    ///
    /// # 错误
    /// - scope 已有任务运行 → EngineError::JobAlreadyRunning
    pub fn try_acquire(&self, scope: &str) -> EngineResult<JobGuard> {
        let mut running = self
            .running
            .lock()
            .map_err(|e| EngineError::Internal(format!("任务锁获取失败: {}", e)))?;

        if !running.insert(scope.to_string()) {
            tracing::warn!(scope = scope, "scope 已有批量任务运行, 拒绝新任务");
            return Err(EngineError::JobAlreadyRunning {
                scope: scope.to_string(),
            });
        }

        tracing::debug!(scope = scope, "批量任务锁已占用");
        Ok(JobGuard {
            scope: scope.to_string(),
            running: Arc::clone(&self.running),
        })
    }

    pub fn is_running(&self, scope: &str) -> bool {
        self.running
            .lock()
            .map(|running| running.contains(scope))
            .unwrap_or(false)
    }
}

/// 任务锁 guard, drop 时释放 scope
#[derive(Debug)]
pub struct JobGuard {
    scope: String,
    running: Arc<Mutex<HashSet<String>>>,
}

impl JobGuard {
    pub fn scope(&self) -> &str {
        &self.scope
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        match self.running.lock() {
            Ok(mut running) => {
                running.remove(&self.scope);
                tracing::debug!(scope = %self.scope, "批量任务锁已释放");
            }
            Err(e) => {
                tracing::error!(scope = %self.scope, error = %e, "批量任务锁释放失败");
            }
        }
    }
}

// ==========================================
// CancellationFlag - 协作式取消信号
// ==========================================
// 执行器在课程之间检查; 已提交的条目不回滚
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
