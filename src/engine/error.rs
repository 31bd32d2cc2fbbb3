// ==========================================
// 排课分配引擎 - 引擎层错误类型
// ==========================================
// 职责: 区分"整批中止"与"任务调度"类错误
// 红线: 单条业务失败不进入此类型, 只写入 AssignmentResult
// ==========================================

use crate::domain::AssignmentResult;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// 未进入批量流程的仓储错误 (如加载快照失败)
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// 同一 scope 已有批量任务运行
    #[error("批量任务运行中: scope={scope}")]
    JobAlreadyRunning { scope: String },

    /// 批量执行中遇到基础设施错误, 已提交条目保持提交
    #[error("批量任务中止 (已处理 {processed} 条): {source}", processed = .partial.total_processed)]
    BatchAborted {
        #[source]
        source: RepositoryError,
        partial: Box<AssignmentResult>,
    },

    #[error("后台任务失败: {0}")]
    Join(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl EngineError {
    /// 中止时已提交的部分结果
    pub fn partial_result(&self) -> Option<&AssignmentResult> {
        match self {
            EngineError::BatchAborted { partial, .. } => Some(partial.as_ref()),
            _ => None,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
