use chrono::{DateTime, Duration, Utc};
use pulse_config::ThresholdRegistry;
use pulse_types::{MetricSample, Severity};
use std::collections::HashMap;
use tracing::debug;

/// 指标的最近越限状态
///
/// 首次越限时创建，恢复时清除，用于冷却期与恢复检测。
#[derive(Debug, Clone)]
pub struct ThresholdState {
    /// 上次告警级别
    pub severity: Severity,

    /// 上次告警时间
    pub since: DateTime<Utc>,

    /// 上次告警时的采样值
    pub last_value: f64,
}

/// 单次采样的评估结果
#[derive(Debug, Clone)]
pub enum Evaluation {
    /// 未越限且无历史状态，或在冷却期内，或指标未配置阈值
    None,

    /// 越限，需要发起告警
    Breach {
        severity: Severity,
        threshold: f64,
        unit: String,
    },

    /// 从越限恢复到正常区间
    Recovery { previous: ThresholdState },
}

/// 阈值评估器
///
/// 比较为包含语义（>=），恰好等于 critical 水位按 critical 处理。
pub struct ThresholdEvaluator {
    registry: ThresholdRegistry,
    states: HashMap<String, ThresholdState>,
    cooldown: Duration,
}

impl ThresholdEvaluator {
    pub fn new(registry: ThresholdRegistry, cooldown_seconds: u64) -> Self {
        Self {
            registry,
            states: HashMap::new(),
            cooldown: Duration::seconds(cooldown_seconds as i64),
        }
    }

    /// 替换阈值注册表，越限状态保留
    pub fn reload(&mut self, registry: ThresholdRegistry) {
        self.registry = registry;
    }

    /// 当前处于越限状态的指标数
    pub fn breaching_count(&self) -> usize {
        self.states.len()
    }

    pub fn state(&self, metric: &str) -> Option<&ThresholdState> {
        self.states.get(metric)
    }

    /// 评估一次采样
    pub fn evaluate(&mut self, sample: &MetricSample) -> Evaluation {
        // 注册表里没有的指标视为未监控
        let threshold = match self.registry.get(&sample.name) {
            Some(t) => t,
            None => return Evaluation::None,
        };

        let target = if sample.value >= threshold.critical {
            Some((Severity::Critical, threshold.critical))
        } else if sample.value >= threshold.warning {
            Some((Severity::Warning, threshold.warning))
        } else {
            None
        };

        match target {
            Some((severity, level)) => {
                if let Some(state) = self.states.get(&sample.name) {
                    let elapsed = sample.timestamp - state.since;
                    if elapsed < self.cooldown {
                        debug!(
                            metric = %sample.name,
                            "Breach within cooldown ({}s elapsed), suppressed",
                            elapsed.num_seconds()
                        );
                        return Evaluation::None;
                    }
                }

                self.states.insert(
                    sample.name.clone(),
                    ThresholdState {
                        severity,
                        since: sample.timestamp,
                        last_value: sample.value,
                    },
                );

                Evaluation::Breach {
                    severity,
                    threshold: level,
                    unit: threshold.unit.clone(),
                }
            }
            None => match self.states.remove(&sample.name) {
                Some(previous) => Evaluation::Recovery { previous },
                None => Evaluation::None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_config::Threshold;

    fn evaluator(cooldown_seconds: u64) -> ThresholdEvaluator {
        let registry = ThresholdRegistry::from_thresholds(vec![Threshold::new(
            "memory_usage",
            80.0,
            95.0,
            "%",
        )]);
        ThresholdEvaluator::new(registry, cooldown_seconds)
    }

    fn sample(value: f64, at: DateTime<Utc>) -> MetricSample {
        MetricSample::new("memory_usage", value, at)
    }

    #[test]
    fn test_critical_at_exact_threshold() {
        let mut eval = evaluator(300);
        let now = Utc::now();

        // 恰好等于 critical 水位按 critical 处理
        match eval.evaluate(&sample(95.0, now)) {
            Evaluation::Breach { severity, threshold, .. } => {
                assert_eq!(severity, Severity::Critical);
                assert_eq!(threshold, 95.0);
            }
            other => panic!("expected breach, got {:?}", other),
        }
    }

    #[test]
    fn test_warning_band() {
        let mut eval = evaluator(300);
        match eval.evaluate(&sample(80.0, Utc::now())) {
            Evaluation::Breach { severity, .. } => assert_eq!(severity, Severity::Warning),
            other => panic!("expected breach, got {:?}", other),
        }
    }

    #[test]
    fn test_cooldown_suppresses_repeat_breach() {
        let mut eval = evaluator(300);
        let t0 = Utc::now();

        assert!(matches!(
            eval.evaluate(&sample(96.0, t0)),
            Evaluation::Breach { .. }
        ));
        // 冷却期内的重复越限静默
        assert!(matches!(
            eval.evaluate(&sample(97.0, t0 + Duration::seconds(60))),
            Evaluation::None
        ));
        // 冷却期过后再次告警
        assert!(matches!(
            eval.evaluate(&sample(97.0, t0 + Duration::seconds(301))),
            Evaluation::Breach { .. }
        ));
    }

    #[test]
    fn test_recovery_clears_state() {
        let mut eval = evaluator(300);
        let t0 = Utc::now();

        eval.evaluate(&sample(96.0, t0));
        assert_eq!(eval.breaching_count(), 1);

        match eval.evaluate(&sample(40.0, t0 + Duration::seconds(10))) {
            Evaluation::Recovery { previous } => {
                assert_eq!(previous.severity, Severity::Critical);
                assert_eq!(previous.last_value, 96.0);
            }
            other => panic!("expected recovery, got {:?}", other),
        }
        assert_eq!(eval.breaching_count(), 0);

        // 没有越限状态时回落不产生恢复
        assert!(matches!(
            eval.evaluate(&sample(40.0, t0 + Duration::seconds(20))),
            Evaluation::None
        ));
    }

    #[test]
    fn test_unmonitored_metric_is_noop() {
        let mut eval = evaluator(300);
        let s = MetricSample::new("unknown_metric", 9999.0, Utc::now());
        assert!(matches!(eval.evaluate(&s), Evaluation::None));
    }
}
