use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::admin::nonce::{NonceGuard, ADMIN_ACTION};
use crate::admin::page::AdminPage;
use crate::campaign_monitor::{
    ApiKey, CampaignMonitorApi, CampaignMonitorError, ListSummary, TemplateSummary,
};
use crate::settings::{SettingsRecord, SettingsStore, StoreError};

/// Form field carrying the anti-forgery token
pub const SECURITY_FIELD: &str = "security";

pub const SAVED: &str = "Saved!";
pub const INVALID_REQUEST: &str = "Invalid Request!";

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Invalid Request!")]
    InvalidRequest,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Settings page backend: renders current settings and accepts updates
pub struct AdminFormHandler {
    settings: Arc<SettingsStore>,
    api: Arc<dyn CampaignMonitorApi>,
    nonce: Arc<NonceGuard>,
}

impl AdminFormHandler {
    pub fn new(
        settings: Arc<SettingsStore>,
        api: Arc<dyn CampaignMonitorApi>,
        nonce: Arc<NonceGuard>,
    ) -> Self {
        Self {
            settings,
            api,
            nonce,
        }
    }

    /// Build the page; lookup failures leave the dropdown empty.
    pub async fn page(&self) -> Result<AdminPage, AdminError> {
        let settings = self.settings.read().await?;
        let (templates, lists) = self.lookups(&settings).await;

        Ok(AdminPage {
            settings,
            templates,
            lists,
            security: self.nonce.issue(ADMIN_ACTION),
        })
    }

    /// Verify the token, then merge the submitted fields into settings.
    pub async fn store<'f, I>(&self, fields: I) -> Result<&'static str, AdminError>
    where
        I: IntoIterator<Item = (&'f str, &'f str)> + Clone,
    {
        let token = fields
            .clone()
            .into_iter()
            .find(|(name, _)| *name == SECURITY_FIELD)
            .map(|(_, value)| value)
            .unwrap_or_default();

        if !self.nonce.verify(ADMIN_ACTION, token) {
            warn!("Rejected settings submission with invalid security token");
            return Err(AdminError::InvalidRequest);
        }

        self.settings.write(fields).await?;
        info!("Settings updated from admin form");
        Ok(SAVED)
    }

    async fn lookups(&self, settings: &SettingsRecord) -> (Vec<TemplateSummary>, Vec<ListSummary>) {
        let Some(api_key) = settings.api_key.as_deref().filter(|key| !key.is_empty()) else {
            return (Vec::new(), Vec::new());
        };
        let auth = ApiKey::new(api_key);
        let client_id = settings.field_or_empty("client_id");

        let templates = self
            .api
            .get_templates(&auth, &client_id)
            .await
            .unwrap_or_else(|e| {
                warn_lookup_failure("Template", &e);
                Vec::new()
            });
        let lists = self
            .api
            .get_lists(&auth, &client_id)
            .await
            .unwrap_or_else(|e| {
                warn_lookup_failure("List", &e);
                Vec::new()
            });

        (templates, lists)
    }
}

fn warn_lookup_failure(lookup: &str, error: &CampaignMonitorError) {
    if error.is_unauthorized() {
        warn!("{} lookup rejected; check the api key and client id", lookup);
    } else {
        warn!("{} lookup failed: {}", lookup, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign_monitor::{CampaignMonitorError, MockCampaignMonitorApi};
    use crate::settings::{MemoryOptionStore, OptionStore, OPTION_NAME};
    use serde_json::json;

    async fn handler_with(
        stored: serde_json::Value,
        api: MockCampaignMonitorApi,
    ) -> (AdminFormHandler, Arc<MemoryOptionStore>, Arc<NonceGuard>) {
        let options = Arc::new(MemoryOptionStore::new());
        options.set(OPTION_NAME, stored).await.unwrap();
        let nonce = Arc::new(NonceGuard::new("test-secret"));
        let handler = AdminFormHandler::new(
            Arc::new(SettingsStore::new(options.clone())),
            Arc::new(api),
            nonce.clone(),
        );
        (handler, options, nonce)
    }

    #[tokio::test]
    async fn test_invalid_token_aborts_before_mutation() {
        let stored = json!({"api_key": "original"});
        let (handler, options, _) = handler_with(stored.clone(), MockCampaignMonitorApi::new()).await;

        for token in ["", "forged"] {
            let result = handler
                .store([(SECURITY_FIELD, token), ("cm_api_key", "attacker")])
                .await;
            assert!(matches!(result, Err(AdminError::InvalidRequest)));
        }

        let missing = handler.store([("cm_api_key", "attacker")]).await;
        assert!(matches!(missing, Err(AdminError::InvalidRequest)));

        assert_eq!(options.get(OPTION_NAME).await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn test_valid_token_saves() {
        let (handler, options, nonce) =
            handler_with(json!({"api_key": "k"}), MockCampaignMonitorApi::new()).await;
        let token = nonce.issue(ADMIN_ACTION);

        let reply = handler
            .store([
                (SECURITY_FIELD, token.as_str()),
                ("action", "store_admin_data"),
                ("cm_from", "Alice"),
                ("cm_api_key", ""),
            ])
            .await
            .unwrap();

        assert_eq!(reply, SAVED);
        assert_eq!(
            options.get(OPTION_NAME).await.unwrap(),
            Some(json!({"api_key": "k", "from": "Alice"}))
        );
    }

    #[tokio::test]
    async fn test_page_lists_templates_and_lists() {
        let mut api = MockCampaignMonitorApi::new();
        api.expect_get_templates()
            .withf(|auth, client_id| auth.expose() == "k" && client_id == "c")
            .returning(|_, _| {
                Ok(vec![TemplateSummary {
                    template_id: "t1".to_string(),
                    name: "Newsletter".to_string(),
                    preview_url: None,
                    screenshot_url: None,
                }])
            });
        api.expect_get_lists().returning(|_, _| {
            Ok(vec![ListSummary {
                list_id: "l1".to_string(),
                name: "Subscribers".to_string(),
            }])
        });

        let (handler, _, nonce) = handler_with(json!({"api_key": "k", "client_id": "c"}), api).await;
        let page = handler.page().await.unwrap();

        assert_eq!(page.templates.len(), 1);
        assert_eq!(page.lists[0].name, "Subscribers");
        assert!(nonce.verify(ADMIN_ACTION, &page.security));
    }

    #[tokio::test]
    async fn test_page_fails_open_on_bad_credentials() {
        let mut api = MockCampaignMonitorApi::new();
        api.expect_get_templates().returning(|_, _| {
            Err(CampaignMonitorError::Api {
                status: 401,
                code: 50,
                message: "Must supply a valid HTTP Basic Authorization header".to_string(),
            })
        });
        api.expect_get_lists().returning(|_, _| {
            Err(CampaignMonitorError::Api {
                status: 401,
                code: 50,
                message: "Must supply a valid HTTP Basic Authorization header".to_string(),
            })
        });

        let (handler, _, _) = handler_with(json!({"api_key": "bad", "client_id": "c"}), api).await;
        let page = handler.page().await.unwrap();

        assert!(page.templates.is_empty());
        assert!(page.lists.is_empty());
        assert!(page.render_html().contains(crate::admin::page::LOOKUP_ERROR_NOTICE));
    }

    #[tokio::test]
    async fn test_page_without_api_key_skips_lookups() {
        let mut api = MockCampaignMonitorApi::new();
        api.expect_get_templates().times(0);
        api.expect_get_lists().times(0);

        let (handler, _, _) = handler_with(json!({}), api).await;
        let page = handler.page().await.unwrap();
        assert_eq!(page.settings, SettingsRecord::default());
    }
}
