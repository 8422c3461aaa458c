use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn, Instrument};

use crate::campaign_monitor::{ApiKey, CampaignId, CampaignMonitorApi, Campaigns};
use crate::notifier::events::{PostStatusHandler, PostStatusTransition};
use crate::notifier::payload::{build_campaign, build_schedule};
use crate::settings::SettingsStore;
use crate::telemetry::{create_notification_span, generate_correlation_id};

pub const PUBLISH_STATUS: &str = "publish";
pub const POST_TYPE: &str = "post";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No api key saved
    NotConfigured,
    /// Not a transition into `publish`, or the post was already published
    NotFirstPublish,
    UnsupportedPostType(String),
    /// Settings could not be read
    SettingsUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Skipped(SkipReason),
    /// Campaign creation did not yield a campaign id; nothing was sent.
    CreateFailed,
    Sent { campaign_id: CampaignId },
    /// The campaign exists remotely but was not sent.
    SendFailed { campaign_id: CampaignId },
}

/// Turns a post's first publish into a sent campaign.
pub struct NotificationWorkflow {
    settings: Arc<SettingsStore>,
    api: Arc<dyn CampaignMonitorApi>,
}

impl NotificationWorkflow {
    pub fn new(settings: Arc<SettingsStore>, api: Arc<dyn CampaignMonitorApi>) -> Self {
        Self { settings, api }
    }

    pub async fn handle(&self, transition: &PostStatusTransition) -> NotificationOutcome {
        let correlation_id = generate_correlation_id();
        let span = create_notification_span(
            &correlation_id,
            &transition.post.title,
            &transition.new_status,
            &transition.old_status,
        );

        let outcome = self.run(transition).instrument(span.clone()).await;
        span.in_scope(|| debug!(?outcome, "Post status transition handled"));
        outcome
    }

    async fn run(&self, transition: &PostStatusTransition) -> NotificationOutcome {
        if transition.new_status != PUBLISH_STATUS || transition.old_status == PUBLISH_STATUS {
            return NotificationOutcome::Skipped(SkipReason::NotFirstPublish);
        }
        if transition.post.post_type != POST_TYPE {
            return NotificationOutcome::Skipped(SkipReason::UnsupportedPostType(
                transition.post.post_type.clone(),
            ));
        }

        let settings = match self.settings.read().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Could not read notifier settings: {}", e);
                return NotificationOutcome::Skipped(SkipReason::SettingsUnavailable);
            }
        };
        let Some(api_key) = settings.api_key.as_deref().filter(|key| !key.is_empty()) else {
            return NotificationOutcome::Skipped(SkipReason::NotConfigured);
        };

        let campaign = build_campaign(&settings, &transition.post);
        let schedule = build_schedule(&settings);
        let client_id = settings.field_or_empty("client_id");
        debug!(list = ?campaign.list_ids, template = %campaign.template_id, "Creating campaign");

        let mut campaigns = Campaigns::new(self.api.as_ref(), ApiKey::new(api_key));

        // Failures past this point are swallowed: no retry, no cleanup of a
        // created-but-unsent campaign.
        let campaign_id = match campaigns.create_from_template(&client_id, &campaign).await {
            Ok(id) => id,
            Err(e) => {
                debug!("Campaign creation failed: {}", e);
                return NotificationOutcome::CreateFailed;
            }
        };

        campaigns.set_campaign_id(campaign_id.clone());

        match campaigns.send(&schedule).await {
            Ok(()) => {
                debug!(campaign = %campaign_id, "Campaign sent");
                NotificationOutcome::Sent { campaign_id }
            }
            Err(e) => {
                debug!(campaign = %campaign_id, "Campaign send failed: {}", e);
                NotificationOutcome::SendFailed { campaign_id }
            }
        }
    }
}

#[async_trait]
impl PostStatusHandler for NotificationWorkflow {
    async fn on_transition(&self, transition: &PostStatusTransition) {
        self.handle(transition).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign_monitor::{CampaignMonitorError, MockCampaignMonitorApi, Schedule};
    use crate::notifier::events::Post;
    use crate::settings::{MemoryOptionStore, OptionStore, StoreError, OPTION_NAME};
    use mockall::predicate::*;
    use mockall::Sequence;
    use serde_json::json;

    fn configured() -> serde_json::Value {
        json!({
            "api_key": "api-key",
            "client_id": "client-1",
            "from": "The Blog",
            "from_email": "news@blog.example.com",
            "confirmation_email": "editor@blog.example.com",
            "chosen_list": "list-1",
            "chosen_template": "tpl-1"
        })
    }

    async fn settings_with(record: Option<serde_json::Value>) -> Arc<SettingsStore> {
        let options = Arc::new(MemoryOptionStore::new());
        if let Some(record) = record {
            options.set(OPTION_NAME, record).await.unwrap();
        }
        Arc::new(SettingsStore::new(options))
    }

    fn transition(new_status: &str, old_status: &str, post_type: &str) -> PostStatusTransition {
        PostStatusTransition {
            new_status: new_status.to_string(),
            old_status: old_status.to_string(),
            post: Post {
                title: "Hello World".to_string(),
                excerpt: "A first post.".to_string(),
                post_type: post_type.to_string(),
                permalink: "https://blog.example.com/hello-world".to_string(),
            },
        }
    }

    /// A mock that fails the test on any outbound call.
    fn silent_api() -> Arc<MockCampaignMonitorApi> {
        let mut api = MockCampaignMonitorApi::new();
        api.expect_create_from_template().times(0);
        api.expect_send().times(0);
        Arc::new(api)
    }

    #[tokio::test]
    async fn test_already_published_never_calls_out() {
        let settings = settings_with(Some(configured())).await;
        let workflow = NotificationWorkflow::new(settings, silent_api());

        for new_status in ["publish", "draft", "private", "trash"] {
            let outcome = workflow
                .handle(&transition(new_status, "publish", "post"))
                .await;
            assert_eq!(
                outcome,
                NotificationOutcome::Skipped(SkipReason::NotFirstPublish)
            );
        }
    }

    #[tokio::test]
    async fn test_non_publish_transition_is_ignored() {
        let settings = settings_with(Some(configured())).await;
        let workflow = NotificationWorkflow::new(settings, silent_api());

        let outcome = workflow.handle(&transition("pending", "draft", "post")).await;
        assert_eq!(outcome, NotificationOutcome::Skipped(SkipReason::NotFirstPublish));
    }

    #[tokio::test]
    async fn test_missing_api_key_never_calls_out() {
        let mut record = configured();
        record.as_object_mut().unwrap().remove("api_key");

        for stored in [None, Some(record), Some(json!({"api_key": ""}))] {
            let workflow = NotificationWorkflow::new(settings_with(stored).await, silent_api());
            let outcome = workflow.handle(&transition("publish", "draft", "post")).await;
            assert_eq!(outcome, NotificationOutcome::Skipped(SkipReason::NotConfigured));
        }
    }

    #[tokio::test]
    async fn test_other_post_types_are_ignored() {
        let settings = settings_with(Some(configured())).await;
        let workflow = NotificationWorkflow::new(settings, silent_api());

        let outcome = workflow.handle(&transition("publish", "draft", "page")).await;
        assert_eq!(
            outcome,
            NotificationOutcome::Skipped(SkipReason::UnsupportedPostType("page".to_string()))
        );
    }

    #[tokio::test]
    async fn test_first_publish_creates_then_sends() {
        let mut api = MockCampaignMonitorApi::new();
        let mut seq = Sequence::new();

        api.expect_create_from_template()
            .withf(|auth, client_id, campaign| {
                auth.expose() == "api-key"
                    && client_id == "client-1"
                    && campaign.list_ids == vec!["list-1".to_string()]
                    && campaign.template_id == "tpl-1"
                    && campaign.subject == "Hello World"
                    && campaign.reply_to == "news@blog.example.com"
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(CampaignId("cmp-1".to_string())));

        api.expect_send()
            .with(
                eq(ApiKey::new("api-key")),
                eq(CampaignId("cmp-1".to_string())),
                eq(Schedule::immediately("editor@blog.example.com")),
            )
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        let workflow =
            NotificationWorkflow::new(settings_with(Some(configured())).await, Arc::new(api));
        let outcome = workflow.handle(&transition("publish", "draft", "post")).await;

        assert_eq!(
            outcome,
            NotificationOutcome::Sent {
                campaign_id: CampaignId("cmp-1".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_create_failure_skips_send() {
        let mut api = MockCampaignMonitorApi::new();
        api.expect_create_from_template()
            .times(1)
            .returning(|_, _, _| {
                Err(CampaignMonitorError::UnexpectedResponse {
                    body: r#"{"Code":1,"Message":"nope"}"#.to_string(),
                })
            });
        api.expect_send().times(0);

        let workflow =
            NotificationWorkflow::new(settings_with(Some(configured())).await, Arc::new(api));
        let outcome = workflow.handle(&transition("publish", "future", "post")).await;

        assert_eq!(outcome, NotificationOutcome::CreateFailed);
    }

    #[tokio::test]
    async fn test_send_failure_is_reported_not_retried() {
        let mut api = MockCampaignMonitorApi::new();
        api.expect_create_from_template()
            .times(1)
            .returning(|_, _, _| Ok(CampaignId("cmp-2".to_string())));
        api.expect_send().times(1).returning(|_, _, _| {
            Err(CampaignMonitorError::Api {
                status: 400,
                code: 121,
                message: "Invalid confirmation email".to_string(),
            })
        });

        let workflow =
            NotificationWorkflow::new(settings_with(Some(configured())).await, Arc::new(api));
        let outcome = workflow.handle(&transition("publish", "draft", "post")).await;

        assert_eq!(
            outcome,
            NotificationOutcome::SendFailed {
                campaign_id: CampaignId("cmp-2".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_unreadable_settings_skip_quietly() {
        let mut options = crate::settings::store::MockOptionStore::new();
        options.expect_get().returning(|_| {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied",
            )))
        });
        let settings = Arc::new(SettingsStore::new(Arc::new(options)));

        let workflow = NotificationWorkflow::new(settings, silent_api());
        let outcome = workflow.handle(&transition("publish", "draft", "post")).await;

        assert_eq!(
            outcome,
            NotificationOutcome::Skipped(SkipReason::SettingsUnavailable)
        );
    }
}
