// cm-notifier - Campaign Monitor email notifications for newly published posts
// This exposes the core components for hosts, the CLI and integration tests

pub mod admin;
pub mod app;
pub mod campaign_monitor;
pub mod cli;
pub mod config;
pub mod notifier;
pub mod server;
pub mod settings;
pub mod shutdown;
pub mod telemetry;

// Re-export key types for easy access
pub use admin::{AdminError, AdminFormHandler, NonceGuard};
pub use app::Services;
pub use campaign_monitor::{CampaignMonitorApi, CampaignMonitorClient, CampaignMonitorError};
pub use config::NotifierConfig;
pub use notifier::{NotificationOutcome, NotificationWorkflow, Notifier, PostEvents, PostStatusTransition};
pub use settings::{SettingsRecord, SettingsStore};
pub use telemetry::{create_notification_span, generate_correlation_id, init_telemetry};
