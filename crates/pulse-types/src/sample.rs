use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 指标采样点
///
/// 由外部采集器按固定周期提供，引擎只读取不持有。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSample {
    /// 指标名称
    pub name: String,

    /// 采样值
    pub value: f64,

    /// 采样时间
    pub timestamp: DateTime<Utc>,
}

impl MetricSample {
    pub fn new(name: impl Into<String>, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            value,
            timestamp,
        }
    }

    /// 以当前时间采样
    pub fn now(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, value, Utc::now())
    }
}
