use crate::dedup::Deduplicator;
use crate::escalation::EscalationPolicy;
use crate::evaluator::{Evaluation, ThresholdEvaluator};
use crate::sink::{AlertSink, LogSink};
use crate::stats::AlertStatistics;
use crate::store::{AlertFilter, AlertStore};
use crate::suppression::SuppressionFilter;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use pulse_config::{MonitorConfig, ThresholdRegistry};
use pulse_notify::{AlertNotification, NotificationRouter};
use pulse_types::{Alert, AlertError, AlertStatus, MetricSample, Severity, RECOVERY_TAG};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// 监控引擎
///
/// 由宿主显式构造并持有（Arc），不做全局单例。两条入口路径
/// （采样评估与外部生命周期命令）都经由内部锁串行访问告警存储；
/// 通知派发在锁外进行。
pub struct MonitorEngine {
    evaluator: RwLock<ThresholdEvaluator>,
    store: Arc<RwLock<AlertStore>>,
    dedup: Deduplicator,
    filter: SuppressionFilter,
    policy: EscalationPolicy,
    router: Arc<NotificationRouter>,
    sink: Arc<dyn AlertSink>,
    sweep_interval: std::time::Duration,
}

impl MonitorEngine {
    /// 按配置构造引擎，通知渠道由配置生成，归档默认只写日志
    pub fn new(config: MonitorConfig) -> Result<Self> {
        let router = NotificationRouter::from_configs(
            &config.channels,
            std::time::Duration::from_secs(config.channel_timeout_seconds),
        )?;
        Ok(Self::with_parts(config, router, Arc::new(LogSink)))
    }

    /// 注入路由器与归档实现（测试和自定义宿主用）
    pub fn with_parts(
        config: MonitorConfig,
        router: NotificationRouter,
        sink: Arc<dyn AlertSink>,
    ) -> Self {
        let registry = ThresholdRegistry::from_thresholds(config.thresholds.clone());

        Self {
            evaluator: RwLock::new(ThresholdEvaluator::new(registry, config.cooldown_seconds)),
            store: Arc::new(RwLock::new(AlertStore::new(config.max_history))),
            dedup: Deduplicator::new(config.dedup_window_seconds),
            filter: SuppressionFilter::new(config.suppressions.clone()),
            policy: EscalationPolicy::new(config.escalation.clone()),
            router: Arc::new(router),
            sink,
            sweep_interval: std::time::Duration::from_secs(config.sweep_interval_seconds),
        }
    }

    /// 热替换阈值注册表
    pub async fn reload_thresholds(&self, registry: ThresholdRegistry) {
        info!("Reloading threshold registry ({} metrics)", registry.len());
        self.evaluator.write().await.reload(registry);
    }

    /// 喂入一次采样，返回创建的告警 ID
    ///
    /// 越限在冷却期内、被去重、被抑制规则丢弃、指标未配置
    /// 或未越限时返回 None，这些都是正常结果而非错误。
    pub async fn evaluate(
        &self,
        metric: &str,
        value: f64,
        timestamp: DateTime<Utc>,
    ) -> Option<String> {
        let sample = MetricSample::new(metric, value, timestamp);
        let evaluation = self.evaluator.write().await.evaluate(&sample);

        match evaluation {
            Evaluation::None => None,
            Evaluation::Breach {
                severity,
                threshold,
                unit,
            } => {
                let alert = Alert::new_at(
                    "metric",
                    severity,
                    format!("{} exceeded {} threshold", metric, severity),
                    format!(
                        "{} is {:.2}{}, {} threshold is {:.2}{}",
                        metric, value, unit, severity, threshold, unit
                    ),
                    timestamp,
                )
                .with_metric(metric, value, threshold)
                .with_context("unit", unit.as_str());

                self.create_alert(alert).await
            }
            Evaluation::Recovery { previous } => {
                let mut recovery = Alert::new_at(
                    "metric",
                    Severity::Info,
                    format!("{} recovered", metric),
                    format!(
                        "{} returned to normal range at {:.2} (last breach value {:.2})",
                        metric, value, previous.last_value
                    ),
                    timestamp,
                )
                .with_tag(RECOVERY_TAG)
                .with_context("metric", metric)
                .with_context("last_value", previous.last_value);

                // 恢复告警不进入活跃集，归档前就置为终态，
                // 避免 list/统计把历史区里的它当成 active
                recovery.status = AlertStatus::Resolved;

                let id = recovery.id.clone();
                self.close_metric_alerts(metric, timestamp).await;

                let mut store = self.store.write().await;
                info!(metric = %metric, "Metric recovered, archiving recovery alert");
                store.push_history(recovery);
                Some(id)
            }
        }
    }

    /// 存入候选告警并派发通知
    async fn create_alert(&self, alert: Alert) -> Option<String> {
        {
            let mut store = self.store.write().await;

            if self.dedup.is_duplicate(&alert, store.active_alerts()) {
                return None;
            }

            if let Some(rule) = self.filter.find_match(&alert) {
                info!(
                    "Alert suppressed by rule ({}): {}",
                    rule.reason, alert.title
                );
                return None;
            }

            store.insert(alert.clone());
        }

        let id = alert.id.clone();
        warn!(alert_id = %id, severity = %alert.severity, "Alert created: {}", alert.title);

        // 锁外派发，只携带不可变字段的拷贝
        let notification = AlertNotification::from_alert(&alert);
        self.router.dispatch(&notification).await;

        let mut store = self.store.write().await;
        if let Some(stored) = store.get_mut(&id) {
            stored.notification_sent = true;
        }

        Some(id)
    }

    /// 指标恢复时解决其名下仍开启的告警
    async fn close_metric_alerts(&self, metric: &str, now: DateTime<Utc>) {
        let resolved = {
            let mut store = self.store.write().await;
            let ids: Vec<String> = store
                .active_alerts()
                .filter(|a| a.metric.as_deref() == Some(metric))
                .map(|a| a.id.clone())
                .collect();

            let mut resolved = Vec::new();
            for id in ids {
                match store.resolve(&id, "monitor", Some("metric recovered".to_string()), now) {
                    Ok(alert) => resolved.push(alert),
                    Err(e) => debug!(alert_id = %id, "Skipped auto-resolve: {}", e),
                }
            }
            resolved
        };

        for alert in &resolved {
            if let Err(e) = self.sink.persist(alert).await {
                warn!(alert_id = %alert.id, "Failed to persist resolved alert: {}", e);
            }
        }
    }

    /// 确认告警
    pub async fn acknowledge(&self, id: &str, actor: &str) -> Result<(), AlertError> {
        self.store.write().await.acknowledge(id, actor, Utc::now())
    }

    /// 解决告警并交给归档
    pub async fn resolve(
        &self,
        id: &str,
        actor: &str,
        note: Option<String>,
    ) -> Result<(), AlertError> {
        let alert = self
            .store
            .write()
            .await
            .resolve(id, actor, note, Utc::now())?;

        if let Err(e) = self.sink.persist(&alert).await {
            warn!(alert_id = %alert.id, "Failed to persist resolved alert: {}", e);
        }
        Ok(())
    }

    /// 抑制告警一段时间
    pub async fn suppress(
        &self,
        id: &str,
        duration: Duration,
        reason: &str,
    ) -> Result<(), AlertError> {
        let now = Utc::now();
        self.suppress_until(id, now + duration, reason, now).await
    }

    pub async fn suppress_until(
        &self,
        id: &str,
        until: DateTime<Utc>,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AlertError> {
        self.store.write().await.suppress(id, until, reason, now)
    }

    /// 按条件查询告警，新创建的在前
    pub async fn list_alerts(&self, filter: &AlertFilter) -> Vec<Alert> {
        self.store.read().await.list(filter)
    }

    pub async fn active_alert_count(&self) -> usize {
        self.store.read().await.active_count()
    }

    pub async fn recent_history(&self, limit: usize) -> Vec<Alert> {
        self.store.read().await.recent_history(limit)
    }

    /// 最近时间窗内的告警统计
    pub async fn get_statistics(&self, window: Duration) -> AlertStatistics {
        self.statistics_at(window, Utc::now()).await
    }

    pub async fn statistics_at(&self, window: Duration, now: DateTime<Utc>) -> AlertStatistics {
        let store = self.store.read().await;
        let since = now - window;
        AlertStatistics::compute(store.active_alerts().chain(store.history().iter()), since)
    }

    /// 一轮巡检：抑制到期恢复 + 到点升级
    pub async fn sweep_at(&self, now: DateTime<Utc>) {
        // 先让到期的抑制恢复活跃，使其重新参与升级判定
        let escalated = {
            let mut store = self.store.write().await;
            store.expire_suppressions(now);

            let due: Vec<String> = store
                .active_alerts()
                .filter(|a| self.policy.is_due(a, now))
                .map(|a| a.id.clone())
                .collect();

            let mut escalated = Vec::new();
            for id in due {
                if let Some(alert) = store.get_mut(&id) {
                    alert.escalation_count += 1;
                    alert.updated_at = now;
                    escalated.push(alert.clone());
                }
            }
            escalated
        };

        // 升级通知在锁外派发
        for alert in &escalated {
            warn!(
                alert_id = %alert.id,
                "Escalating alert (escalation #{}): {}",
                alert.escalation_count,
                alert.title
            );
            let notification = AlertNotification::from_alert(alert);
            self.router.dispatch(&notification).await;
        }
    }

    /// 启动周期巡检任务，返回可中止的句柄
    pub fn start_sweeper(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let engine = Arc::clone(self);
        info!(
            "Starting monitor sweeper (interval {}s)",
            engine.sweep_interval.as_secs()
        );

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(engine.sweep_interval);
            loop {
                ticker.tick().await;
                engine.sweep_at(Utc::now()).await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_config::{EscalationSchedule, SuppressionRule, Threshold};
    use pulse_types::AlertStatus;
    use std::collections::HashMap;

    fn base_config() -> MonitorConfig {
        MonitorConfig {
            thresholds: vec![
                Threshold::new("memory_usage", 80.0, 95.0, "%"),
                Threshold::new("cpu_usage", 75.0, 90.0, "%"),
            ],
            ..Default::default()
        }
    }

    fn engine(config: MonitorConfig) -> MonitorEngine {
        MonitorEngine::with_parts(
            config,
            NotificationRouter::new(std::time::Duration::from_secs(5)),
            Arc::new(LogSink),
        )
    }

    #[tokio::test]
    async fn test_breach_then_recovery_scenario() {
        let engine = engine(base_config());
        let t0 = Utc::now();

        // 96 >= 95 触发 critical 告警
        let id = engine.evaluate("memory_usage", 96.0, t0).await.unwrap();
        assert_eq!(engine.active_alert_count().await, 1);

        let alerts = engine.list_alerts(&AlertFilter::default()).await;
        assert!(alerts[0].title.contains("memory_usage"));
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[0].id, id);
        assert!(alerts[0].notification_sent);

        // 回落到 40 产生一条恢复告警，活跃数归零
        let recovery_id = engine
            .evaluate("memory_usage", 40.0, t0 + Duration::seconds(10))
            .await
            .unwrap();
        assert_ne!(recovery_id, id);
        assert_eq!(engine.active_alert_count().await, 0);

        let history = engine.recent_history(10).await;
        let recovery = history.iter().find(|a| a.id == recovery_id).unwrap();
        assert!(recovery.is_recovery());
        assert_eq!(recovery.severity, Severity::Info);
    }

    #[tokio::test]
    async fn test_recovery_alert_not_listed_as_active() {
        let engine = engine(base_config());
        let t0 = Utc::now();

        engine.evaluate("memory_usage", 96.0, t0).await.unwrap();
        let recovery_id = engine
            .evaluate("memory_usage", 40.0, t0 + Duration::seconds(10))
            .await
            .unwrap();

        // 恢复后 active 视图必须为空，与 active_alert_count 一致
        let active = engine
            .list_alerts(&AlertFilter {
                status: Some(AlertStatus::Active),
                ..Default::default()
            })
            .await;
        assert!(active.is_empty());
        assert_eq!(engine.active_alert_count().await, 0);

        // 恢复告警以终态归档，出现在 resolved 视图里
        let resolved = engine
            .list_alerts(&AlertFilter {
                status: Some(AlertStatus::Resolved),
                ..Default::default()
            })
            .await;
        assert!(resolved.iter().any(|a| a.id == recovery_id));

        let stats = engine.get_statistics(Duration::hours(1)).await;
        assert_eq!(stats.active, 0);
        assert_eq!(stats.total, 2);
    }

    #[tokio::test]
    async fn test_cooldown_yields_single_alert() {
        let engine = engine(base_config());
        let t0 = Utc::now();

        assert!(engine.evaluate("cpu_usage", 95.0, t0).await.is_some());
        assert!(engine
            .evaluate("cpu_usage", 96.0, t0 + Duration::seconds(30))
            .await
            .is_none());
        assert_eq!(engine.active_alert_count().await, 1);
    }

    #[tokio::test]
    async fn test_unmonitored_metric_returns_none() {
        let engine = engine(base_config());
        assert!(engine
            .evaluate("disk_usage", 100.0, Utc::now())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_suppression_rule_drops_alert() {
        let mut config = base_config();
        config.suppressions = vec![
            SuppressionRule::new("metric", Severity::Critical).with_reason("maintenance")
        ];
        let engine = engine(config);

        assert!(engine
            .evaluate("memory_usage", 99.0, Utc::now())
            .await
            .is_none());
        assert_eq!(engine.active_alert_count().await, 0);
    }

    #[tokio::test]
    async fn test_lifecycle_commands() {
        let engine = engine(base_config());
        let id = engine
            .evaluate("memory_usage", 96.0, Utc::now())
            .await
            .unwrap();

        engine.acknowledge(&id, "ops").await.unwrap();
        engine
            .resolve(&id, "ops", Some("rebooted".to_string()))
            .await
            .unwrap();

        // 已解决的告警从活跃索引移除，再次操作报 NotFound
        assert!(matches!(
            engine.resolve(&id, "ops", None).await,
            Err(AlertError::NotFound(_))
        ));
        assert!(matches!(
            engine.acknowledge("no_such_id", "ops").await,
            Err(AlertError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_suppression_expiry_reactivates() {
        let engine = engine(base_config());
        let t0 = Utc::now();
        let id = engine.evaluate("memory_usage", 96.0, t0).await.unwrap();

        engine
            .suppress_until(&id, t0 + Duration::seconds(60), "noisy", t0)
            .await
            .unwrap();

        let suppressed = engine
            .list_alerts(&AlertFilter {
                status: Some(AlertStatus::Suppressed),
                ..Default::default()
            })
            .await;
        assert_eq!(suppressed.len(), 1);

        engine.sweep_at(t0 + Duration::seconds(61)).await;

        let active = engine
            .list_alerts(&AlertFilter {
                status: Some(AlertStatus::Active),
                ..Default::default()
            })
            .await;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, id);
    }

    #[tokio::test]
    async fn test_escalation_fires_once_per_delay() {
        let mut config = base_config();
        let mut delays = HashMap::new();
        delays.insert(Severity::Critical, vec![300]);
        config.escalation = EscalationSchedule::new(delays);
        let engine = engine(config);

        let t0 = Utc::now();
        let id = engine.evaluate("memory_usage", 96.0, t0).await.unwrap();

        // 未到点不升级
        engine.sweep_at(t0 + Duration::seconds(299)).await;
        let alert = &engine.list_alerts(&AlertFilter::default()).await[0];
        assert_eq!(alert.escalation_count, 0);

        engine.sweep_at(t0 + Duration::seconds(301)).await;
        let alert = engine
            .list_alerts(&AlertFilter::default())
            .await
            .into_iter()
            .find(|a| a.id == id)
            .unwrap();
        assert_eq!(alert.escalation_count, 1);

        // 时刻表只有一级，走完即终止
        engine.sweep_at(t0 + Duration::seconds(3600)).await;
        let alert = engine
            .list_alerts(&AlertFilter::default())
            .await
            .into_iter()
            .find(|a| a.id == id)
            .unwrap();
        assert_eq!(alert.escalation_count, 1);
    }

    #[tokio::test]
    async fn test_acknowledged_alert_not_escalated() {
        let mut config = base_config();
        let mut delays = HashMap::new();
        delays.insert(Severity::Critical, vec![300]);
        config.escalation = EscalationSchedule::new(delays);
        let engine = engine(config);

        let t0 = Utc::now();
        let id = engine.evaluate("memory_usage", 96.0, t0).await.unwrap();
        engine.acknowledge(&id, "ops").await.unwrap();

        engine.sweep_at(t0 + Duration::seconds(301)).await;
        let alert = &engine.list_alerts(&AlertFilter::default()).await[0];
        assert_eq!(alert.escalation_count, 0);
    }

    #[tokio::test]
    async fn test_statistics_window() {
        let engine = engine(base_config());
        let t0 = Utc::now();

        let id = engine.evaluate("memory_usage", 96.0, t0).await.unwrap();
        engine.evaluate("cpu_usage", 80.0, t0).await.unwrap();
        engine.resolve(&id, "ops", None).await.unwrap();

        let stats = engine.get_statistics(Duration::hours(24)).await;
        assert_eq!(stats.total, 2);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.by_type.get(&"metric".to_string()), Some(&2));
        assert!(stats.average_resolution_seconds >= 0.0);
    }

    #[tokio::test]
    async fn test_reload_thresholds() {
        let engine = engine(base_config());

        // 新注册表里没有 memory_usage，旧阈值失效
        engine
            .reload_thresholds(ThresholdRegistry::from_thresholds(vec![Threshold::new(
                "error_rate",
                1.0,
                5.0,
                "%",
            )]))
            .await;

        assert!(engine
            .evaluate("memory_usage", 99.0, Utc::now())
            .await
            .is_none());
        assert!(engine
            .evaluate("error_rate", 6.0, Utc::now())
            .await
            .is_some());
    }
}
