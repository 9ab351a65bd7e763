pub mod alert;
pub mod error;
pub mod sample;
pub mod severity;

pub use alert::{Alert, AlertStatus, ContextValue, RECOVERY_TAG};
pub use error::AlertError;
pub use sample::MetricSample;
pub use severity::Severity;
