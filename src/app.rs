use anyhow::{Context, Result};
use std::sync::Arc;

use crate::admin::{AdminFormHandler, NonceGuard};
use crate::campaign_monitor::{CampaignMonitorApi, CampaignMonitorClient};
use crate::config::NotifierConfig;
use crate::notifier::{Notifier, PostEvents};
use crate::server::AppState;
use crate::settings::{FileOptionStore, SettingsStore};

/// Every long-lived service, wired once at startup
pub struct Services {
    pub config: NotifierConfig,
    pub events: Arc<PostEvents>,
    pub settings: Arc<SettingsStore>,
    pub api: Arc<dyn CampaignMonitorApi>,
    pub notifier: Notifier,
    pub admin: Arc<AdminFormHandler>,
}

impl Services {
    /// Production wiring: file-backed settings and the REST client.
    pub fn bootstrap(config: NotifierConfig) -> Result<Self> {
        let options = Arc::new(FileOptionStore::new(&config.storage.path));
        let api = CampaignMonitorClient::new(&config.campaign_monitor)
            .context("Failed to build Campaign Monitor client")?;
        Ok(Self::assemble(
            config,
            Arc::new(SettingsStore::new(options)),
            Arc::new(api),
        ))
    }

    pub fn assemble(
        config: NotifierConfig,
        settings: Arc<SettingsStore>,
        api: Arc<dyn CampaignMonitorApi>,
    ) -> Self {
        let nonce = match config.admin.nonce_secret.as_deref() {
            Some(secret) if !secret.is_empty() => NonceGuard::new(secret),
            _ => NonceGuard::random(),
        };

        let events = Arc::new(PostEvents::new());
        let notifier = Notifier::new(events.clone(), settings.clone(), api.clone());
        let admin = Arc::new(AdminFormHandler::new(
            settings.clone(),
            api.clone(),
            Arc::new(nonce),
        ));

        Self {
            config,
            events,
            settings,
            api,
            notifier,
            admin,
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            events: self.events.clone(),
            admin: self.admin.clone(),
            hook_secret: self
                .config
                .admin
                .hook_secret
                .as_deref()
                .filter(|secret| !secret.is_empty())
                .map(Arc::from),
        }
    }
}
