use pulse_types::{ContextValue, Severity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 抑制规则
///
/// 类型与级别完全相等、且 conditions 中每个键在告警上下文里
/// 不存在或值相等时规则命中。命中的候选告警直接丢弃。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressionRule {
    pub alert_type: String,

    pub severity: Severity,

    #[serde(default)]
    pub conditions: HashMap<String, ContextValue>,

    /// 运维记录用的抑制原因
    #[serde(default)]
    pub reason: String,
}

impl SuppressionRule {
    pub fn new(alert_type: impl Into<String>, severity: Severity) -> Self {
        Self {
            alert_type: alert_type.into(),
            severity,
            conditions: HashMap::new(),
            reason: String::new(),
        }
    }

    pub fn with_condition(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.conditions.insert(key.into(), value.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// 候选告警是否命中本规则
    pub fn matches(
        &self,
        alert_type: &str,
        severity: Severity,
        context: &HashMap<String, ContextValue>,
    ) -> bool {
        if self.alert_type != alert_type || self.severity != severity {
            return false;
        }

        // 上下文缺键不阻止命中，存在且不相等才阻止
        self.conditions.iter().all(|(key, expected)| {
            context.get(key).map(|actual| actual == expected).unwrap_or(true)
        })
    }
}
