use chrono::{DateTime, Utc};
use pulse_types::{Alert, AlertError, AlertStatus, Severity};
use std::collections::HashMap;
use tracing::{debug, info};

/// 告警查询过滤条件，字段全为 None 时返回全部
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub status: Option<AlertStatus>,
    pub severity: Option<Severity>,
    pub alert_type: Option<String>,
    pub metric: Option<String>,
}

impl AlertFilter {
    fn matches(&self, alert: &Alert) -> bool {
        if let Some(status) = self.status {
            if alert.status != status {
                return false;
            }
        }
        if let Some(severity) = self.severity {
            if alert.severity != severity {
                return false;
            }
        }
        if let Some(alert_type) = &self.alert_type {
            if &alert.alert_type != alert_type {
                return false;
            }
        }
        if let Some(metric) = &self.metric {
            if alert.metric.as_ref() != Some(metric) {
                return false;
            }
        }
        true
    }
}

/// 告警存储
///
/// 活跃告警的唯一属主。已解决的告警移入有限长度的历史区，
/// 供统计和查询使用，最旧的先被淘汰。
pub struct AlertStore {
    active: HashMap<String, Alert>,
    history: Vec<Alert>,
    max_history: usize,
}

impl AlertStore {
    pub fn new(max_history: usize) -> Self {
        Self {
            active: HashMap::new(),
            history: Vec::new(),
            max_history,
        }
    }

    /// 存入新告警
    pub fn insert(&mut self, alert: Alert) {
        debug!(alert_id = %alert.id, "Storing alert: {}", alert.title);
        self.active.insert(alert.id.clone(), alert);
    }

    pub fn get(&self, id: &str) -> Option<&Alert> {
        self.active.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Alert> {
        self.active.get_mut(id)
    }

    pub fn active_alerts(&self) -> impl Iterator<Item = &Alert> {
        self.active.values()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// 确认告警
    ///
    /// ID 不存在或状态不是 active 时返回 NotFound。
    pub fn acknowledge(
        &mut self,
        id: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AlertError> {
        let alert = self
            .active
            .get_mut(id)
            .filter(|a| a.status == AlertStatus::Active)
            .ok_or_else(|| AlertError::NotFound(id.to_string()))?;

        alert.acknowledge(actor, now);
        info!(alert_id = %id, "Alert acknowledged by {}", actor);
        Ok(())
    }

    /// 解决告警，移出活跃集并归档到历史区
    pub fn resolve(
        &mut self,
        id: &str,
        actor: &str,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Alert, AlertError> {
        let mut alert = match self.active.remove(id) {
            None => return Err(AlertError::NotFound(id.to_string())),
            Some(alert) if alert.status == AlertStatus::Suppressed => {
                self.active.insert(id.to_string(), alert);
                return Err(AlertError::InvalidTransition {
                    id: id.to_string(),
                    from: AlertStatus::Suppressed,
                    to: AlertStatus::Resolved,
                });
            }
            Some(alert) => alert,
        };
        alert.resolve(actor, note, now);
        info!(alert_id = %id, "Alert resolved by {}", actor);

        let resolved = alert.clone();
        self.push_history(alert);
        Ok(resolved)
    }

    /// 抑制告警到指定时间
    pub fn suppress(
        &mut self,
        id: &str,
        until: DateTime<Utc>,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AlertError> {
        let alert = self
            .active
            .get_mut(id)
            .ok_or_else(|| AlertError::NotFound(id.to_string()))?;

        if alert.status == AlertStatus::Suppressed {
            return Err(AlertError::InvalidTransition {
                id: id.to_string(),
                from: AlertStatus::Suppressed,
                to: AlertStatus::Suppressed,
            });
        }

        alert.suppress(until, reason, now);
        info!(alert_id = %id, "Alert suppressed until {}", until);
        Ok(())
    }

    /// 扫描抑制到期的告警并恢复活跃，返回恢复的 ID
    pub fn expire_suppressions(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let mut reactivated = Vec::new();

        for alert in self.active.values_mut() {
            if alert.status == AlertStatus::Suppressed {
                if let Some(until) = alert.suppressed_until {
                    if now > until {
                        alert.reactivate(now);
                        reactivated.push(alert.id.clone());
                    }
                }
            }
        }

        for id in &reactivated {
            info!(alert_id = %id, "Suppression expired, alert re-activated");
        }

        reactivated
    }

    /// 按条件查询活跃与历史告警，新创建的在前
    pub fn list(&self, filter: &AlertFilter) -> Vec<Alert> {
        let mut result: Vec<Alert> = self
            .active
            .values()
            .chain(self.history.iter())
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();

        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }

    /// 直接归档（恢复告警等不进入活跃集的记录）
    pub fn push_history(&mut self, alert: Alert) {
        self.history.push(alert);
        if self.history.len() > self.max_history {
            self.history.remove(0);
        }
    }

    pub fn history(&self) -> &[Alert] {
        &self.history
    }

    /// 最近归档的告警，新者在前
    pub fn recent_history(&self, limit: usize) -> Vec<Alert> {
        self.history.iter().rev().take(limit).cloned().collect()
    }
}
