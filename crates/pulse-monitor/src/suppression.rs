use pulse_config::SuppressionRule;
use pulse_types::Alert;

/// 抑制过滤器
///
/// 第一条命中的规则生效，没有规则命中则放行。
pub struct SuppressionFilter {
    rules: Vec<SuppressionRule>,
}

impl SuppressionFilter {
    pub fn new(rules: Vec<SuppressionRule>) -> Self {
        Self { rules }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// 命中的第一条规则
    pub fn find_match(&self, alert: &Alert) -> Option<&SuppressionRule> {
        self.rules
            .iter()
            .find(|rule| rule.matches(&alert.alert_type, alert.severity, &alert.context))
    }

    pub fn is_suppressed(&self, alert: &Alert) -> bool {
        self.find_match(alert).is_some()
    }
}
