pub mod channel;
pub mod escalation;
pub mod loader;
pub mod monitor;
pub mod suppression;
pub mod thresholds;

pub use channel::{ChannelConfig, ChannelKind, SmtpConfig};
pub use escalation::EscalationSchedule;
pub use loader::ConfigLoader;
pub use monitor::MonitorConfig;
pub use suppression::SuppressionRule;
pub use thresholds::{Threshold, ThresholdRegistry};
