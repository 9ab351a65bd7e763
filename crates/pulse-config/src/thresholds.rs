use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 单个指标的阈值配置
///
/// 比较语义为「越大越差」：value >= critical 触发严重告警，
/// value >= warning 触发警告。极性相反的百分比指标（如缓存命中率）
/// 应以缺口形式配置（100 - 命中率），使阈值方向一致。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Threshold {
    /// 指标名称
    pub metric: String,

    /// 警告水位
    pub warning: f64,

    /// 严重水位
    pub critical: f64,

    /// 单位（如 "ms"、"%"）
    pub unit: String,
}

impl Threshold {
    pub fn new(metric: impl Into<String>, warning: f64, critical: f64, unit: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            warning,
            critical,
            unit: unit.into(),
        }
    }
}

/// 阈值注册表
///
/// 按指标名索引的纯配置，注册表里没有的指标视为未监控。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdRegistry {
    thresholds: HashMap<String, Threshold>,
}

impl ThresholdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 常见性能指标的默认水位
    pub fn standard() -> Self {
        Self::from_thresholds(vec![
            Threshold::new("response_time_ms", 1000.0, 3000.0, "ms"),
            Threshold::new("memory_usage", 80.0, 95.0, "%"),
            Threshold::new("cpu_usage", 75.0, 90.0, "%"),
            Threshold::new("query_time_ms", 500.0, 2000.0, "ms"),
            // 缓存命中率按缺口（100 - 命中率）配置
            Threshold::new("cache_hit_deficit", 30.0, 60.0, "%"),
            Threshold::new("error_rate", 1.0, 5.0, "%"),
        ])
    }

    pub fn from_thresholds(list: Vec<Threshold>) -> Self {
        let thresholds = list.into_iter().map(|t| (t.metric.clone(), t)).collect();
        Self { thresholds }
    }

    pub fn get(&self, metric: &str) -> Option<&Threshold> {
        self.thresholds.get(metric)
    }

    pub fn insert(&mut self, threshold: Threshold) {
        self.thresholds.insert(threshold.metric.clone(), threshold);
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let registry = ThresholdRegistry::standard();
        let t = registry.get("memory_usage").unwrap();
        assert_eq!(t.warning, 80.0);
        assert_eq!(t.critical, 95.0);
        assert!(registry.get("unknown_metric").is_none());
    }

    #[test]
    fn test_insert_replaces() {
        let mut registry = ThresholdRegistry::new();
        registry.insert(Threshold::new("cpu_usage", 70.0, 85.0, "%"));
        registry.insert(Threshold::new("cpu_usage", 75.0, 90.0, "%"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("cpu_usage").unwrap().warning, 75.0);
    }
}
