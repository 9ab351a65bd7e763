pub mod dedup;
pub mod engine;
pub mod escalation;
pub mod evaluator;
pub mod sink;
pub mod stats;
pub mod store;
pub mod suppression;

pub use dedup::Deduplicator;
pub use engine::MonitorEngine;
pub use escalation::EscalationPolicy;
pub use evaluator::{Evaluation, ThresholdEvaluator, ThresholdState};
pub use sink::{AlertSink, LogSink};
pub use stats::AlertStatistics;
pub use store::{AlertFilter, AlertStore};
pub use suppression::SuppressionFilter;
