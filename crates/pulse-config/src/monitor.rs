use crate::channel::ChannelConfig;
use crate::escalation::EscalationSchedule;
use crate::suppression::SuppressionRule;
use crate::thresholds::Threshold;
use serde::{Deserialize, Serialize};

/// 监控引擎配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// 同一指标两次告警之间的冷却期（秒）
    pub cooldown_seconds: u64,

    /// (type, severity, title) 去重窗口（秒）
    pub dedup_window_seconds: u64,

    /// 抑制到期与升级巡检周期（秒）
    pub sweep_interval_seconds: u64,

    /// 单渠道发送超时（秒）
    pub channel_timeout_seconds: u64,

    /// 历史告警保留上限
    pub max_history: usize,

    /// 阈值配置
    pub thresholds: Vec<Threshold>,

    /// 通知渠道
    pub channels: Vec<ChannelConfig>,

    /// 升级时刻表
    pub escalation: EscalationSchedule,

    /// 抑制规则
    pub suppressions: Vec<SuppressionRule>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: 300,
            dedup_window_seconds: 300,
            sweep_interval_seconds: 60,
            channel_timeout_seconds: 30,
            max_history: 1000,
            thresholds: Vec::new(),
            channels: Vec::new(),
            escalation: EscalationSchedule::default(),
            suppressions: Vec::new(),
        }
    }
}
