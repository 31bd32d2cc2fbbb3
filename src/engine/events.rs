// ==========================================
// 排课分配引擎 - 批量任务进度事件
// ==========================================
// 职责: 定义进度上报 trait, 批量执行器只依赖 trait
// 说明: 调用方可注入 channel 实现, 在后台任务运行时增量接收进度
// ==========================================

use crate::domain::AssignmentOperation;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

// ==========================================
// 进度事件
// ==========================================

/// 单条课程的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemOutcome {
    Assigned,
    Unchanged,
    Failed,
}

/// 批量任务进度事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssignmentProgress {
    /// 任务开始
    Started {
        job_id: String,
        operation: AssignmentOperation,
        total: usize,
    },
    /// 处理完一门课程
    ItemProcessed {
        job_id: String,
        course_id: i64,
        processed: usize,
        total: usize,
        outcome: ItemOutcome,
        message: Option<String>,
    },
    /// 任务结束 (含取消)
    Finished {
        job_id: String,
        assigned: usize,
        failed: usize,
        cancelled: bool,
    },
    /// 基础设施错误导致任务中止
    Aborted { job_id: String, error: String },
}

impl AssignmentProgress {
    pub fn job_id(&self) -> &str {
        match self {
            AssignmentProgress::Started { job_id, .. }
            | AssignmentProgress::ItemProcessed { job_id, .. }
            | AssignmentProgress::Finished { job_id, .. }
            | AssignmentProgress::Aborted { job_id, .. } => job_id,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AssignmentProgress::Finished { .. } | AssignmentProgress::Aborted { .. }
        )
    }
}

// ==========================================
// 进度上报 Trait
// ==========================================

/// 进度接收者
///
/// 上报失败不影响批量任务本身 (接收端关闭后静默丢弃)
pub trait AssignmentProgressSink: Send + Sync {
    fn report(&self, event: AssignmentProgress);
}

/// 空操作接收者
#[derive(Debug, Clone, Default)]
pub struct NoOpProgressSink;

impl AssignmentProgressSink for NoOpProgressSink {
    fn report(&self, event: AssignmentProgress) {
        tracing::trace!(job_id = event.job_id(), "NoOpProgressSink: 跳过进度事件");
    }
}

/// 基于 tokio 无界通道的接收者
#[derive(Debug, Clone)]
pub struct ChannelProgressSink {
    sender: UnboundedSender<AssignmentProgress>,
}

impl ChannelProgressSink {
    pub fn new(sender: UnboundedSender<AssignmentProgress>) -> Self {
        Self { sender }
    }
}

impl AssignmentProgressSink for ChannelProgressSink {
    fn report(&self, event: AssignmentProgress) {
        if let Err(e) = self.sender.send(event) {
            tracing::debug!(job_id = e.0.job_id(), "进度接收端已关闭, 丢弃事件");
        }
    }
}

/// 可选的进度接收者包装
///
/// 简化 Option<Arc<dyn AssignmentProgressSink>> 的使用
#[derive(Clone, Default)]
pub struct OptionalProgressSink {
    inner: Option<Arc<dyn AssignmentProgressSink>>,
}

impl OptionalProgressSink {
    pub fn with_sink(sink: Arc<dyn AssignmentProgressSink>) -> Self {
        Self { inner: Some(sink) }
    }

    pub fn none() -> Self {
        Self { inner: None }
    }

    pub fn report(&self, event: AssignmentProgress) {
        if let Some(sink) = &self.inner {
            sink.report(event);
        }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn test_channel_sink_delivers_events_in_order() {
        let (tx, mut rx) = unbounded_channel();
        let sink = OptionalProgressSink::with_sink(Arc::new(ChannelProgressSink::new(tx)));
        assert!(sink.is_configured());

        sink.report(AssignmentProgress::Started {
            job_id: "job-1".to_string(),
            operation: AssignmentOperation::ClearAll,
            total: 1,
        });
        sink.report(AssignmentProgress::Finished {
            job_id: "job-1".to_string(),
            assigned: 1,
            failed: 0,
            cancelled: false,
        });

        let first = rx.try_recv().unwrap();
        assert!(!first.is_terminal());
        let second = rx.try_recv().unwrap();
        assert!(second.is_terminal());
        assert_eq!(second.job_id(), "job-1");
    }

    #[test]
    fn test_closed_receiver_is_ignored() {
        let (tx, rx) = unbounded_channel();
        drop(rx);
        let sink = ChannelProgressSink::new(tx);
        sink.report(AssignmentProgress::Aborted {
            job_id: "job-2".to_string(),
            error: "db down".to_string(),
        });
    }

    #[test]
    fn test_none_sink_is_silent() {
        let sink = OptionalProgressSink::none();
        assert!(!sink.is_configured());
        sink.report(AssignmentProgress::Aborted {
            job_id: "job-3".to_string(),
            error: "x".to_string(),
        });
        NoOpProgressSink.report(AssignmentProgress::Aborted {
            job_id: "job-3".to_string(),
            error: "x".to_string(),
        });
    }
}
