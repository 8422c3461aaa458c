use crate::campaign_monitor::client::CampaignMonitorApi;
use crate::campaign_monitor::errors::CampaignMonitorError;
use crate::campaign_monitor::types::{ApiKey, CampaignId, CampaignInfo, Schedule};

/// Campaign operations for one account, with an optional bound campaign.
///
/// Creation does not bind the campaign it creates: callers inspect the
/// result and bind explicitly before sending.
pub struct Campaigns<'a> {
    api: &'a dyn CampaignMonitorApi,
    auth: ApiKey,
    campaign_id: Option<CampaignId>,
}

impl<'a> Campaigns<'a> {
    pub fn new(api: &'a dyn CampaignMonitorApi, auth: ApiKey) -> Self {
        Self {
            api,
            auth,
            campaign_id: None,
        }
    }

    pub async fn create_from_template(
        &self,
        client_id: &str,
        campaign: &CampaignInfo,
    ) -> Result<CampaignId, CampaignMonitorError> {
        self.api
            .create_from_template(&self.auth, client_id, campaign)
            .await
    }

    pub fn set_campaign_id(&mut self, campaign_id: CampaignId) {
        self.campaign_id = Some(campaign_id);
    }

    /// Send the bound campaign.
    pub async fn send(&self, schedule: &Schedule) -> Result<(), CampaignMonitorError> {
        let campaign_id = self
            .campaign_id
            .as_ref()
            .ok_or(CampaignMonitorError::NoCampaignBound)?;
        self.api.send(&self.auth, campaign_id, schedule).await
    }
}
