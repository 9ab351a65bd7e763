use chrono::{Duration, Utc};
use pulse_config::{ChannelConfig, ChannelKind, EscalationSchedule, MonitorConfig, Threshold};
use pulse_monitor::{AlertFilter, LogSink, MonitorEngine};
use pulse_notify::{DashboardNotifier, NotificationRouter};
use pulse_types::Severity;
use std::collections::HashMap;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    println!("=== PULSE 告警引擎示例 ===\n");

    // 1. 配置阈值与升级时刻表
    let mut delays = HashMap::new();
    delays.insert(Severity::Critical, vec![5, 15]);

    let config = MonitorConfig {
        cooldown_seconds: 3,
        thresholds: vec![
            Threshold::new("memory_usage", 80.0, 95.0, "%"),
            Threshold::new("response_time_ms", 1000.0, 3000.0, "ms"),
        ],
        escalation: EscalationSchedule::new(delays),
        ..Default::default()
    };

    // 2. 注册仪表盘渠道（进程内缓冲，示例里无需真实传输）
    let dashboard = DashboardNotifier::new(50);
    let buffer = dashboard.buffer();

    let mut router = NotificationRouter::new(std::time::Duration::from_secs(5));
    router.register(
        ChannelConfig::new(ChannelKind::Dashboard).with_min_severity(Severity::Warning),
        Box::new(dashboard),
    );

    let engine = Arc::new(MonitorEngine::with_parts(config, router, Arc::new(LogSink)));

    // 3. 模拟采样流
    let t0 = Utc::now();
    println!("场景 1: memory_usage = 96 (critical 水位 95)");
    let id = engine.evaluate("memory_usage", 96.0, t0).await;
    println!("  创建告警: {:?}\n", id);

    println!("场景 2: 冷却期内的重复越限");
    let dup = engine
        .evaluate("memory_usage", 97.0, t0 + Duration::seconds(1))
        .await;
    println!("  结果: {:?} (冷却期静默)\n", dup);

    println!("场景 3: 到点升级");
    engine.sweep_at(t0 + Duration::seconds(6)).await;
    let alerts = engine.list_alerts(&AlertFilter::default()).await;
    println!("  升级次数: {}\n", alerts[0].escalation_count);

    println!("场景 4: 指标恢复");
    let recovery = engine
        .evaluate("memory_usage", 42.0, t0 + Duration::seconds(10))
        .await;
    println!(
        "  恢复告警: {:?}, 活跃告警数: {}\n",
        recovery,
        engine.active_alert_count().await
    );

    // 4. 查看仪表盘缓冲与统计
    let notifications = buffer.read().await;
    println!("仪表盘收到 {} 条通知", notifications.len());

    let stats = engine.get_statistics(Duration::hours(1)).await;
    println!(
        "统计: total={}, resolved={}, 平均解决耗时 {:.1}s",
        stats.total, stats.resolved, stats.average_resolution_seconds
    );
}
