use anyhow::Result;
use async_trait::async_trait;
use pulse_types::Alert;
use tracing::info;

/// 告警归档落地接口
///
/// 告警解决后交给外部持久化（解决即追加）。
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn persist(&self, alert: &Alert) -> Result<()>;
}

/// 只写日志的默认实现
pub struct LogSink;

#[async_trait]
impl AlertSink for LogSink {
    async fn persist(&self, alert: &Alert) -> Result<()> {
        info!(alert_id = %alert.id, "Alert archived: {}", alert.title);
        Ok(())
    }
}
