use chrono::{DateTime, Utc};
use pulse_types::{Alert, Severity};
use serde::{Deserialize, Serialize};

/// 通知负载
///
/// 告警不可变字段的拷贝，派发时在告警存储锁之外携带。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertNotification {
    pub alert_id: String,
    pub alert_type: String,
    pub severity: Severity,
    pub title: String,
    pub body: String,
    pub metric: Option<String>,
    pub value: Option<f64>,
    pub threshold: Option<f64>,
    pub escalation_count: u32,
    pub timestamp: DateTime<Utc>,
}

impl AlertNotification {
    pub fn from_alert(alert: &Alert) -> Self {
        let mut body = alert.message.clone();

        if let (Some(metric), Some(value), Some(threshold)) =
            (&alert.metric, alert.value, alert.threshold)
        {
            body.push_str(&format!(
                "\n\nMetric: {}\nValue: {:.2}\nThreshold: {:.2}",
                metric, value, threshold
            ));
        }

        if alert.escalation_count > 0 {
            body.push_str(&format!("\n\nEscalation #{}", alert.escalation_count));
        }

        Self {
            alert_id: alert.id.clone(),
            alert_type: alert.alert_type.clone(),
            severity: alert.severity,
            title: alert.title.clone(),
            body,
            metric: alert.metric.clone(),
            value: alert.value,
            threshold: alert.threshold,
            escalation_count: alert.escalation_count,
            timestamp: alert.updated_at,
        }
    }

    /// 邮件/短信用的单行摘要
    pub fn summary(&self) -> String {
        format!("[{}] {}", self.severity, self.title)
    }
}
