use crate::message::AlertNotification;
use crate::notifier::Notifier;
use crate::providers::build_notifier;
use anyhow::Result;
use pulse_config::ChannelConfig;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

struct ChannelBinding {
    config: ChannelConfig,
    notifier: Box<dyn Notifier>,
}

/// 通知路由器
///
/// 按渠道的级别/类型过滤条件选择目标渠道并逐个派发。
/// 单渠道失败或超时只记录日志，不影响其余渠道，也不上抛。
pub struct NotificationRouter {
    channels: Vec<ChannelBinding>,
    send_timeout: Duration,
}

impl NotificationRouter {
    pub fn new(send_timeout: Duration) -> Self {
        Self {
            channels: Vec::new(),
            send_timeout,
        }
    }

    /// 从渠道配置构造路由器，禁用的渠道直接跳过
    pub fn from_configs(configs: &[ChannelConfig], send_timeout: Duration) -> Result<Self> {
        let mut router = Self::new(send_timeout);

        for config in configs {
            if !config.enabled {
                debug!(kind = ?config.kind, "Skipping disabled channel");
                continue;
            }
            let notifier = build_notifier(config)?;
            router.register(config.clone(), notifier);
        }

        Ok(router)
    }

    /// 注册渠道
    pub fn register(&mut self, config: ChannelConfig, notifier: Box<dyn Notifier>) {
        info!("Registered notification channel: {}", notifier.name());
        self.channels.push(ChannelBinding { config, notifier });
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// 派发通知，返回成功送达的渠道数
    pub async fn dispatch(&self, notification: &AlertNotification) -> usize {
        let mut delivered = 0;

        for binding in &self.channels {
            if !binding
                .config
                .accepts(notification.severity, &notification.alert_type)
            {
                continue;
            }

            match timeout(self.send_timeout, binding.notifier.send(notification)).await {
                Ok(Ok(result)) => {
                    if result.success {
                        info!(
                            "Notification sent via {}: {}",
                            binding.notifier.name(),
                            notification.title
                        );
                        delivered += 1;
                    } else {
                        error!(
                            "Notification failed via {}: {}",
                            binding.notifier.name(),
                            result.message
                        );
                    }
                }
                Ok(Err(e)) => {
                    error!(
                        "Notification error via {}: {}",
                        binding.notifier.name(),
                        e
                    );
                }
                Err(_) => {
                    warn!(
                        "Notification via {} timed out after {:?}",
                        binding.notifier.name(),
                        self.send_timeout
                    );
                }
            }
        }

        delivered
    }
}
