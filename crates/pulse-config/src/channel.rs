use pulse_types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 通知渠道类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Dashboard,
    Email,
    Webhook,
    Slack,
    Sms,
    Push,
}

/// SMTP 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

/// 通知渠道配置
///
/// 过滤条件（级别、类型）对所有渠道通用，端点字段按渠道类型取用：
/// webhook/slack/push/sms 使用 endpoint，email/sms 使用 recipients，
/// email 另需 smtp 块。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub kind: ChannelKind,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// 低于该级别的告警不投递
    #[serde(default = "default_min_severity")]
    pub min_severity: Severity,

    /// 接收的告警类型，空列表表示全部
    #[serde(default)]
    pub alert_types: Vec<String>,

    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub recipients: Vec<String>,

    #[serde(default)]
    pub smtp: Option<SmtpConfig>,

    /// webhook 附加请求头
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
}

fn default_enabled() -> bool {
    true
}

fn default_min_severity() -> Severity {
    Severity::Info
}

impl ChannelConfig {
    pub fn new(kind: ChannelKind) -> Self {
        Self {
            kind,
            enabled: true,
            min_severity: Severity::Info,
            alert_types: Vec::new(),
            endpoint: None,
            recipients: Vec::new(),
            smtp: None,
            headers: None,
        }
    }

    pub fn with_min_severity(mut self, min_severity: Severity) -> Self {
        self.min_severity = min_severity;
        self
    }

    pub fn with_alert_types(mut self, types: Vec<String>) -> Self {
        self.alert_types = types;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// 该渠道是否接收给定级别/类型的告警
    pub fn accepts(&self, severity: Severity, alert_type: &str) -> bool {
        if !self.enabled {
            return false;
        }
        if severity < self.min_severity {
            return false;
        }
        self.alert_types.is_empty() || self.alert_types.iter().any(|t| t == alert_type)
    }
}
