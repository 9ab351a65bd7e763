pub mod message;
pub mod notifier;
pub mod providers;
pub mod router;

pub use message::AlertNotification;
pub use notifier::{Notifier, NotifyResult};
pub use providers::{
    build_notifier, DashboardNotifier, EmailNotifier, PushNotifier, SlackNotifier, SmsNotifier,
    WebhookNotifier,
};
pub use router::NotificationRouter;
