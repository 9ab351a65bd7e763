use chrono::{DateTime, Duration, Utc};
use pulse_config::EscalationSchedule;
use pulse_types::{Alert, AlertStatus};

/// 升级策略
///
/// 延迟为自 created_at 起算的偏移量，列表走完即终止，不循环。
/// 只有 active 状态的告警参与升级，确认即暂停。
pub struct EscalationPolicy {
    schedule: EscalationSchedule,
}

impl EscalationPolicy {
    pub fn new(schedule: EscalationSchedule) -> Self {
        Self { schedule }
    }

    /// 下一次升级的时刻，时刻表走完返回 None
    pub fn next_due(&self, alert: &Alert) -> Option<DateTime<Utc>> {
        let delays = self.schedule.delays_for(alert.severity);
        delays
            .get(alert.escalation_count as usize)
            .map(|secs| alert.created_at + Duration::seconds(*secs as i64))
    }

    /// 告警是否到了该升级的时刻
    pub fn is_due(&self, alert: &Alert, now: DateTime<Utc>) -> bool {
        if alert.status != AlertStatus::Active {
            return false;
        }
        match self.next_due(alert) {
            Some(due) => now >= due,
            None => false,
        }
    }
}
