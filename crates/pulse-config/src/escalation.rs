use pulse_types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 升级时刻表
///
/// 每个级别一组自创建时刻起算的延迟（秒）。延迟列表走完后不再升级。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EscalationSchedule {
    delays: HashMap<Severity, Vec<u64>>,
}

impl EscalationSchedule {
    pub fn new(delays: HashMap<Severity, Vec<u64>>) -> Self {
        Self { delays }
    }

    /// 空时刻表，任何告警都不升级
    pub fn disabled() -> Self {
        Self {
            delays: HashMap::new(),
        }
    }

    pub fn set(&mut self, severity: Severity, delays: Vec<u64>) {
        self.delays.insert(severity, delays);
    }

    /// 指定级别的延迟序列（秒）
    pub fn delays_for(&self, severity: Severity) -> &[u64] {
        self.delays.get(&severity).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for EscalationSchedule {
    fn default() -> Self {
        let mut delays = HashMap::new();
        delays.insert(Severity::Emergency, vec![120, 300, 900]);
        delays.insert(Severity::Critical, vec![300, 900, 3600]);
        delays.insert(Severity::Warning, vec![1800, 7200]);
        delays.insert(Severity::Info, vec![]);
        Self { delays }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let schedule = EscalationSchedule::default();
        assert_eq!(schedule.delays_for(Severity::Critical), &[300, 900, 3600]);
        assert!(schedule.delays_for(Severity::Info).is_empty());
    }

    #[test]
    fn test_disabled_schedule() {
        let schedule = EscalationSchedule::disabled();
        assert!(schedule.delays_for(Severity::Emergency).is_empty());
    }
}
