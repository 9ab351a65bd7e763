use crate::alert::AlertStatus;

/// 告警操作错误
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    /// 活跃告警集中不存在该 ID（或状态不允许该操作按 NotFound 处理）
    #[error("alert not found: {0}")]
    NotFound(String),

    /// 状态机不允许的迁移
    #[error("invalid transition for alert {id}: {from:?} -> {to:?}")]
    InvalidTransition {
        id: String,
        from: AlertStatus,
        to: AlertStatus,
    },
}
