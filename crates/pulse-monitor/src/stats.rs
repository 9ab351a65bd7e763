use chrono::{DateTime, Utc};
use pulse_types::{Alert, AlertStatus, Severity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 时间窗内的告警统计
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertStatistics {
    pub total: usize,
    pub by_severity: HashMap<Severity, usize>,
    pub by_type: HashMap<String, usize>,
    pub active: usize,
    pub acknowledged: usize,
    pub suppressed: usize,
    pub resolved: usize,
    /// 平均解决耗时（秒），窗口内无已解决告警时为 0
    pub average_resolution_seconds: f64,
}

impl AlertStatistics {
    /// 对创建时间落在 [since, now] 的告警（活跃 + 历史）做聚合
    pub fn compute<'a>(
        alerts: impl Iterator<Item = &'a Alert>,
        since: DateTime<Utc>,
    ) -> Self {
        let mut stats = AlertStatistics::default();
        let mut resolution_total = 0i64;
        let mut resolution_count = 0usize;

        for alert in alerts {
            if alert.created_at < since {
                continue;
            }

            stats.total += 1;
            *stats.by_severity.entry(alert.severity).or_insert(0) += 1;
            *stats.by_type.entry(alert.alert_type.clone()).or_insert(0) += 1;

            match alert.status {
                AlertStatus::Active => stats.active += 1,
                AlertStatus::Acknowledged => stats.acknowledged += 1,
                AlertStatus::Suppressed => stats.suppressed += 1,
                AlertStatus::Resolved => stats.resolved += 1,
            }

            if let Some(resolved_at) = alert.resolved_at {
                if resolved_at >= since {
                    resolution_total += (resolved_at - alert.created_at).num_seconds();
                    resolution_count += 1;
                }
            }
        }

        if resolution_count > 0 {
            stats.average_resolution_seconds = resolution_total as f64 / resolution_count as f64;
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_counts_and_average() {
        let t0 = Utc::now();

        let active = Alert::new_at("metric", Severity::Critical, "a", "m", t0);
        let mut resolved =
            Alert::new_at("system", Severity::Warning, "b", "m", t0 + Duration::seconds(10));
        resolved.resolve("ops", None, t0 + Duration::seconds(70));
        // 窗口之外的不计入
        let old = Alert::new_at("metric", Severity::Info, "c", "m", t0 - Duration::hours(48));

        let alerts = [active, resolved, old];
        let stats = AlertStatistics::compute(alerts.iter(), t0 - Duration::hours(24));

        assert_eq!(stats.total, 2);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.by_severity.get(&Severity::Critical), Some(&1));
        assert_eq!(stats.by_type.get(&"system".to_string()), Some(&1));
        assert_eq!(stats.average_resolution_seconds, 60.0);
    }

    #[test]
    fn test_average_is_zero_without_resolutions() {
        let t0 = Utc::now();
        let alerts = [Alert::new_at("metric", Severity::Warning, "a", "m", t0)];

        let stats = AlertStatistics::compute(alerts.iter(), t0 - Duration::hours(1));
        assert_eq!(stats.average_resolution_seconds, 0.0);
    }
}
