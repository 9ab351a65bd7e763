use crate::message::AlertNotification;
use crate::notifier::{Notifier, NotifyResult};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use pulse_config::{ChannelConfig, ChannelKind, SmtpConfig};
use pulse_types::Severity;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

/// 按渠道配置构造通知器
pub fn build_notifier(config: &ChannelConfig) -> Result<Box<dyn Notifier>> {
    match config.kind {
        ChannelKind::Dashboard => Ok(Box::new(DashboardNotifier::new(100))),
        ChannelKind::Email => {
            let smtp = config
                .smtp
                .clone()
                .ok_or_else(|| anyhow!("email channel requires smtp config"))?;
            if config.recipients.is_empty() {
                return Err(anyhow!("email channel requires recipients"));
            }
            Ok(Box::new(EmailNotifier::new(smtp, config.recipients.clone())))
        }
        ChannelKind::Webhook => {
            let url = config
                .endpoint
                .clone()
                .ok_or_else(|| anyhow!("webhook channel requires endpoint"))?;
            Ok(Box::new(WebhookNotifier::new(url, config.headers.clone())))
        }
        ChannelKind::Slack => {
            let url = config
                .endpoint
                .clone()
                .ok_or_else(|| anyhow!("slack channel requires endpoint"))?;
            Ok(Box::new(SlackNotifier::new(url)))
        }
        ChannelKind::Sms => {
            let url = config
                .endpoint
                .clone()
                .ok_or_else(|| anyhow!("sms channel requires gateway endpoint"))?;
            Ok(Box::new(SmsNotifier::new(url, config.recipients.clone())))
        }
        ChannelKind::Push => {
            let url = config
                .endpoint
                .clone()
                .ok_or_else(|| anyhow!("push channel requires endpoint"))?;
            Ok(Box::new(PushNotifier::new(url)))
        }
    }
}

// ============================================================================
// 仪表盘通知（进程内环形缓冲）
// ============================================================================

/// 仪表盘通知器
///
/// 不做任何传输，把最近的通知留在内存里供宿主 UI 轮询。
pub struct DashboardNotifier {
    buffer: Arc<RwLock<VecDeque<AlertNotification>>>,
    capacity: usize,
}

impl DashboardNotifier {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// 缓冲区句柄，宿主可以持有后轮询
    pub fn buffer(&self) -> Arc<RwLock<VecDeque<AlertNotification>>> {
        self.buffer.clone()
    }

    /// 最近的通知，新者在前
    pub async fn recent(&self, limit: usize) -> Vec<AlertNotification> {
        let buffer = self.buffer.read().await;
        buffer.iter().rev().take(limit).cloned().collect()
    }
}

#[async_trait]
impl Notifier for DashboardNotifier {
    async fn send(&self, notification: &AlertNotification) -> Result<NotifyResult> {
        let mut buffer = self.buffer.write().await;
        if buffer.len() == self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(notification.clone());
        Ok(NotifyResult::success())
    }

    fn name(&self) -> &str {
        "dashboard"
    }
}

// ============================================================================
// 邮件通知
// ============================================================================

pub struct EmailNotifier {
    config: SmtpConfig,
    to: Vec<String>,
}

impl EmailNotifier {
    pub fn new(config: SmtpConfig, to: Vec<String>) -> Self {
        Self { config, to }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, notification: &AlertNotification) -> Result<NotifyResult> {
        use lettre::message::header::ContentType;
        use lettre::transport::smtp::authentication::Credentials;
        use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

        let creds = Credentials::new(
            self.config.username.clone(),
            self.config.password.clone(),
        );

        // 异步传输，发送阻塞在 await 而不是执行器线程上，
        // 路由器的发送超时才能对其生效
        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.host)?
                .credentials(creds)
                .port(self.config.port)
                .build();

        for recipient in &self.to {
            let email = Message::builder()
                .from(self.config.from.parse()?)
                .to(recipient.parse()?)
                .subject(notification.summary())
                .header(ContentType::TEXT_PLAIN)
                .body(format!(
                    "{}\n\nSeverity: {}\nTime: {}",
                    notification.body, notification.severity, notification.timestamp
                ))?;

            if let Err(e) = mailer.send(email).await {
                return Ok(NotifyResult::failure(format!(
                    "Email send to {} failed: {}",
                    recipient, e
                )));
            }
        }

        Ok(NotifyResult::success())
    }

    fn name(&self) -> &str {
        "email"
    }
}

// ============================================================================
// Webhook 通知
// ============================================================================

pub struct WebhookNotifier {
    url: String,
    headers: Option<HashMap<String, String>>,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: String, headers: Option<HashMap<String, String>>) -> Self {
        Self {
            url,
            headers,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notification: &AlertNotification) -> Result<NotifyResult> {
        let mut request = self.client.post(&self.url);

        if let Some(headers) = &self.headers {
            for (key, value) in headers {
                request = request.header(key, value);
            }
        }

        let response = request.json(notification).send().await?;

        if response.status().is_success() {
            Ok(NotifyResult::success())
        } else {
            Ok(NotifyResult::failure(format!(
                "Webhook failed with status: {}",
                response.status()
            )))
        }
    }

    fn name(&self) -> &str {
        "webhook"
    }
}

// ============================================================================
// Slack 通知
// ============================================================================

pub struct SlackNotifier {
    webhook_url: String,
    client: reqwest::Client,
}

impl SlackNotifier {
    pub fn new(webhook_url: String) -> Self {
        Self {
            webhook_url,
            client: reqwest::Client::new(),
        }
    }

    fn build_message(&self, notification: &AlertNotification) -> serde_json::Value {
        let color = match notification.severity {
            Severity::Info => "good",
            Severity::Warning => "warning",
            Severity::Critical | Severity::Emergency => "danger",
        };

        serde_json::json!({
            "attachments": [{
                "color": color,
                "title": notification.title,
                "text": notification.body,
                "fields": [
                    {
                        "title": "Severity",
                        "value": notification.severity.to_string(),
                        "short": true
                    },
                    {
                        "title": "Time",
                        "value": notification.timestamp.to_rfc3339(),
                        "short": true
                    }
                ]
            }]
        })
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, notification: &AlertNotification) -> Result<NotifyResult> {
        let body = self.build_message(notification);

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(NotifyResult::success())
        } else {
            Ok(NotifyResult::failure(format!(
                "Slack failed: {}",
                response.status()
            )))
        }
    }

    fn name(&self) -> &str {
        "slack"
    }
}

// ============================================================================
// 短信通知（HTTP 网关）
// ============================================================================

pub struct SmsNotifier {
    gateway_url: String,
    recipients: Vec<String>,
    client: reqwest::Client,
}

impl SmsNotifier {
    pub fn new(gateway_url: String, recipients: Vec<String>) -> Self {
        Self {
            gateway_url,
            recipients,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for SmsNotifier {
    async fn send(&self, notification: &AlertNotification) -> Result<NotifyResult> {
        let body = serde_json::json!({
            "to": self.recipients,
            "text": notification.summary(),
        });

        let response = self
            .client
            .post(&self.gateway_url)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(NotifyResult::success())
        } else {
            Ok(NotifyResult::failure(format!(
                "SMS gateway failed: {}",
                response.status()
            )))
        }
    }

    fn name(&self) -> &str {
        "sms"
    }
}

// ============================================================================
// 推送通知
// ============================================================================

pub struct PushNotifier {
    endpoint: String,
    client: reqwest::Client,
}

impl PushNotifier {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for PushNotifier {
    async fn send(&self, notification: &AlertNotification) -> Result<NotifyResult> {
        let body = serde_json::json!({
            "title": notification.title,
            "body": notification.body,
            "severity": notification.severity,
            "alert_id": notification.alert_id,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(NotifyResult::success())
        } else {
            Ok(NotifyResult::failure(format!(
                "Push failed: {}",
                response.status()
            )))
        }
    }

    fn name(&self) -> &str {
        "push"
    }
}
