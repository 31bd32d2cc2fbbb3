// ==========================================
// 排课分配引擎 - API层错误类型
// ==========================================
// 职责: 把仓储/引擎错误转换为调用方可读的错误消息
// 红线: 所有错误必须包含显式原因
// ==========================================

use crate::domain::AssignmentResult;
use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("乐观锁冲突: {0}")]
    OptimisticLockFailure(String),

    #[error("批量任务运行中: scope={scope}")]
    JobAlreadyRunning { scope: String },

    /// 批量任务中止, 携带已提交部分的结果
    #[error("批量任务中止: {reason}")]
    BatchAborted {
        reason: String,
        partial: Box<AssignmentResult>,
    },

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::OptimisticLockFailure {
                entity,
                id,
                expected,
                actual,
            } => ApiError::OptimisticLockFailure(format!(
                "{}(id={})已被其他用户修改（期望revision={}，实际revision={}）",
                entity, id, expected, actual
            )),
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::InvalidInput(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::InvalidInput(format!("外键约束违反: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Repository(e) => ApiError::from(e),
            EngineError::JobAlreadyRunning { scope } => ApiError::JobAlreadyRunning { scope },
            EngineError::BatchAborted { source, partial } => ApiError::BatchAborted {
                reason: source.to_string(),
                partial,
            },
            EngineError::Join(msg) | EngineError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AssignmentOperation;

    #[test]
    fn test_repository_error_conversion() {
        let err: ApiError = RepositoryError::OptimisticLockFailure {
            entity: "course".to_string(),
            id: 3,
            expected: 1,
            actual: 2,
        }
        .into();
        assert!(matches!(err, ApiError::OptimisticLockFailure(_)));
        assert!(err.to_string().contains("course(id=3)"));
    }

    #[test]
    fn test_storage_errors_map_to_caller_categories() {
        let err: ApiError = RepositoryError::FieldValueError {
            field: "expiration_date".to_string(),
            message: "'2020/01/01': input contains invalid characters".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::InvalidInput(ref msg) if msg.contains("expiration_date")));

        let err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(err, ApiError::DatabaseConnectionError(_)));

        let err: ApiError = EngineError::Internal("lock".to_string()).into();
        assert!(matches!(err, ApiError::InternalError(_)));
    }

    #[test]
    fn test_engine_error_conversion_keeps_partial() {
        let mut partial = AssignmentResult::new("job", AssignmentOperation::ClearAll);
        partial.record_success();
        let err: ApiError = EngineError::BatchAborted {
            source: RepositoryError::DatabaseConnectionError("gone".to_string()),
            partial: Box::new(partial),
        }
        .into();

        match err {
            ApiError::BatchAborted { reason, partial } => {
                assert!(reason.contains("gone"));
                assert_eq!(partial.assigned, 1);
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
