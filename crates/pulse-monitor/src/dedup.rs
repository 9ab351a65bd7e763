use chrono::Duration;
use pulse_types::Alert;
use tracing::debug;

/// 告警去重器
///
/// 活跃告警里已有 (type, severity, title) 相同且创建时间在窗口内的，
/// 丢弃新候选。活跃告警规模有限，线性扫描即可。
pub struct Deduplicator {
    window: Duration,
}

impl Deduplicator {
    pub fn new(window_seconds: u64) -> Self {
        Self {
            window: Duration::seconds(window_seconds as i64),
        }
    }

    /// 候选是否与某个活跃告警重复
    pub fn is_duplicate<'a>(
        &self,
        candidate: &Alert,
        active: impl Iterator<Item = &'a Alert>,
    ) -> bool {
        for existing in active {
            if existing.alert_type == candidate.alert_type
                && existing.severity == candidate.severity
                && existing.title == candidate.title
            {
                let elapsed = candidate.created_at - existing.created_at;
                if elapsed.abs() < self.window {
                    debug!(
                        "Duplicate alert dropped: {} (existing {} created {}s ago)",
                        candidate.title,
                        existing.id,
                        elapsed.num_seconds()
                    );
                    return true;
                }
            }
        }

        false
    }
}
