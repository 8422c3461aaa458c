pub mod events;
pub mod payload;
pub mod workflow;

pub use events::{Post, PostEvents, PostStatusHandler, PostStatusTransition, SubscriptionId};
pub use workflow::{NotificationOutcome, NotificationWorkflow, SkipReason};

use std::sync::{Arc, Mutex};
use tracing::info;

use crate::campaign_monitor::CampaignMonitorApi;
use crate::settings::SettingsStore;

/// The notifier service: owns the workflow and its subscription.
///
/// Constructed once by the host with its collaborators; nothing is
/// delivered until [`Notifier::start`].
pub struct Notifier {
    events: Arc<PostEvents>,
    workflow: Arc<NotificationWorkflow>,
    subscription: Mutex<Option<SubscriptionId>>,
}

impl Notifier {
    pub fn new(
        events: Arc<PostEvents>,
        settings: Arc<SettingsStore>,
        api: Arc<dyn CampaignMonitorApi>,
    ) -> Self {
        Self {
            events,
            workflow: Arc::new(NotificationWorkflow::new(settings, api)),
            subscription: Mutex::new(None),
        }
    }

    /// Subscribe the workflow to post status transitions. Idempotent.
    pub fn start(&self) -> SubscriptionId {
        let mut subscription = self
            .subscription
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(id) = *subscription {
            return id;
        }
        let id = self.events.subscribe(self.workflow.clone());
        *subscription = Some(id);
        info!(
            subscribers = self.events.subscriber_count(),
            "Notifier subscribed to post status transitions"
        );
        id
    }

    /// Returns false if the notifier was not running.
    pub fn stop(&self) -> bool {
        let mut subscription = self
            .subscription
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match subscription.take() {
            Some(id) => {
                let removed = self.events.unsubscribe(id);
                info!("Notifier unsubscribed from post status transitions");
                removed
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.subscription
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    pub fn events(&self) -> &Arc<PostEvents> {
        &self.events
    }

    /// Direct access for callers that want the outcome of a transition.
    pub fn workflow(&self) -> &Arc<NotificationWorkflow> {
        &self.workflow
    }
}
