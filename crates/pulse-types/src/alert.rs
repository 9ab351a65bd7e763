use crate::severity::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// 恢复告警携带的标签
pub const RECOVERY_TAG: &str = "recovery";

/// 告警状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
    Suppressed,
}

/// 上下文值
///
/// 诊断负载的封闭类型集合，保证通知格式化和抑制规则匹配类型安全。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl From<&str> for ContextValue {
    fn from(v: &str) -> Self {
        ContextValue::String(v.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(v: String) -> Self {
        ContextValue::String(v)
    }
}

impl From<i64> for ContextValue {
    fn from(v: i64) -> Self {
        ContextValue::Integer(v)
    }
}

impl From<f64> for ContextValue {
    fn from(v: f64) -> Self {
        ContextValue::Float(v)
    }
}

impl From<bool> for ContextValue {
    fn from(v: bool) -> Self {
        ContextValue::Bool(v)
    }
}

/// 告警实例
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// 唯一 ID，格式 type_severity_timestamp_random
    pub id: String,

    /// 告警类型（如 "metric"、"performance"、"system"、"security"）
    pub alert_type: String,

    /// 级别
    pub severity: Severity,

    /// 标题
    pub title: String,

    /// 详细消息
    pub message: String,

    /// 触发指标（指标类告警才有）
    pub metric: Option<String>,

    /// 触发值
    pub value: Option<f64>,

    /// 触发阈值
    pub threshold: Option<f64>,

    /// 诊断上下文
    #[serde(default)]
    pub context: HashMap<String, ContextValue>,

    /// 当前状态
    pub status: AlertStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub acknowledged_by: Option<String>,
    pub acknowledged_at: Option<DateTime<Utc>>,

    pub resolved_by: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution_note: Option<String>,

    pub suppressed_until: Option<DateTime<Utc>>,
    pub suppression_reason: Option<String>,

    /// 升级次数，只增不减
    pub escalation_count: u32,

    /// 创建时的通知是否已发出
    pub notification_sent: bool,

    /// 标签
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Alert {
    /// 以当前时间创建活跃告警
    pub fn new(
        alert_type: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new_at(alert_type, severity, title, message, Utc::now())
    }

    /// 以指定时间创建活跃告警
    pub fn new_at(
        alert_type: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        message: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let alert_type = alert_type.into();
        let suffix = Uuid::new_v4().simple().to_string();
        let id = format!(
            "{}_{}_{}_{}",
            alert_type,
            severity,
            created_at.timestamp_millis(),
            &suffix[..8]
        );

        Self {
            id,
            alert_type,
            severity,
            title: title.into(),
            message: message.into(),
            metric: None,
            value: None,
            threshold: None,
            context: HashMap::new(),
            status: AlertStatus::Active,
            created_at,
            updated_at: created_at,
            acknowledged_by: None,
            acknowledged_at: None,
            resolved_by: None,
            resolved_at: None,
            resolution_note: None,
            suppressed_until: None,
            suppression_reason: None,
            escalation_count: 0,
            notification_sent: false,
            tags: BTreeSet::new(),
        }
    }

    /// 附加指标信息
    pub fn with_metric(mut self, metric: impl Into<String>, value: f64, threshold: f64) -> Self {
        self.metric = Some(metric.into());
        self.value = Some(value);
        self.threshold = Some(threshold);
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// 是否为恢复告警
    pub fn is_recovery(&self) -> bool {
        self.tags.contains(RECOVERY_TAG)
    }

    /// 确认告警
    pub fn acknowledge(&mut self, actor: impl Into<String>, now: DateTime<Utc>) {
        self.status = AlertStatus::Acknowledged;
        self.acknowledged_by = Some(actor.into());
        self.acknowledged_at = Some(now);
        self.updated_at = now;
    }

    /// 解决告警
    pub fn resolve(
        &mut self,
        actor: impl Into<String>,
        note: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.status = AlertStatus::Resolved;
        self.resolved_by = Some(actor.into());
        self.resolved_at = Some(now);
        self.resolution_note = note;
        self.updated_at = now;
    }

    /// 抑制告警到指定时间
    pub fn suppress(
        &mut self,
        until: DateTime<Utc>,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.status = AlertStatus::Suppressed;
        self.suppressed_until = Some(until);
        self.suppression_reason = Some(reason.into());
        self.updated_at = now;
    }

    /// 抑制期满后恢复活跃
    pub fn reactivate(&mut self, now: DateTime<Utc>) {
        self.status = AlertStatus::Active;
        self.suppressed_until = None;
        self.updated_at = now;
    }
}
