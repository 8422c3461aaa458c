use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use moka::future::Cache;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::campaign_monitor::errors::CampaignMonitorError;
use crate::campaign_monitor::types::*;
use crate::config::CampaignMonitorConfig;

/// Campaign Monitor operations the notifier depends on.
///
/// Credentials travel with each call because the api key lives in the
/// settings record and can change between calls.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CampaignMonitorApi: Send + Sync {
    /// Create a draft campaign from a template; yields the new campaign id.
    async fn create_from_template(
        &self,
        auth: &ApiKey,
        client_id: &str,
        campaign: &CampaignInfo,
    ) -> Result<CampaignId, CampaignMonitorError>;

    async fn send(
        &self,
        auth: &ApiKey,
        campaign_id: &CampaignId,
        schedule: &Schedule,
    ) -> Result<(), CampaignMonitorError>;

    async fn get_clients(&self, auth: &ApiKey) -> Result<Vec<ClientSummary>, CampaignMonitorError>;

    async fn get_templates(
        &self,
        auth: &ApiKey,
        client_id: &str,
    ) -> Result<Vec<TemplateSummary>, CampaignMonitorError>;

    async fn get_lists(
        &self,
        auth: &ApiKey,
        client_id: &str,
    ) -> Result<Vec<ListSummary>, CampaignMonitorError>;
}

/// Rate-limited REST client for the Campaign Monitor API
#[derive(Debug)]
pub struct CampaignMonitorClient {
    http: Client,
    base_url: Url,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    lookups: Cache<String, serde_json::Value>,
}

impl CampaignMonitorClient {
    pub fn new(config: &CampaignMonitorConfig) -> Result<Self, CampaignMonitorError> {
        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(per_second).allow_burst(per_second);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("cm-notifier/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let lookups = Cache::builder()
            .max_capacity(256)
            .time_to_live(Duration::from_secs(config.lookup_cache_ttl_seconds))
            .build();

        let base_url = Url::parse(&config.base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| CampaignMonitorError::InvalidBaseUrl(config.base_url.clone()))?;

        Ok(Self {
            http,
            base_url,
            rate_limiter,
            lookups,
        })
    }

    /// Append percent-encoded path segments to the API root, so ids can
    /// never change which endpoint is addressed.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a request once the rate limiter allows it; non-2xx becomes an error.
    async fn execute(&self, request: RequestBuilder) -> Result<String, CampaignMonitorError> {
        self.rate_limiter.until_ready().await;

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        Ok(body)
    }

    /// GET a lookup endpoint, serving repeats from the cache.
    async fn lookup<T: DeserializeOwned>(
        &self,
        auth: &ApiKey,
        segments: &[&str],
    ) -> Result<T, CampaignMonitorError> {
        let url = self.url(segments);
        let cache_key = format!("{}:{}", key_fingerprint(auth), url.path());

        let value = match self.lookups.get(&cache_key).await {
            Some(cached) => {
                debug!("Lookup cache hit for {}", url.path());
                cached
            }
            None => {
                let request = self
                    .http
                    .get(url)
                    .basic_auth(auth.expose(), Some("x"));
                let body = self.execute(request).await?;
                let value: serde_json::Value = parse_body(&body)?;
                self.lookups.insert(cache_key, value.clone()).await;
                value
            }
        };

        serde_json::from_value(value.clone()).map_err(|_| CampaignMonitorError::UnexpectedResponse {
            body: value.to_string(),
        })
    }
}

#[async_trait]
impl CampaignMonitorApi for CampaignMonitorClient {
    async fn create_from_template(
        &self,
        auth: &ApiKey,
        client_id: &str,
        campaign: &CampaignInfo,
    ) -> Result<CampaignId, CampaignMonitorError> {
        let request = self
            .http
            .post(self.url(&["campaigns", client_id, "fromtemplate.json"]))
            .basic_auth(auth.expose(), Some("x"))
            .json(campaign);

        let body = self.execute(request).await?;

        // The only success shape is a bare JSON string holding the new id.
        match parse_body(&body)? {
            serde_json::Value::String(id) => Ok(CampaignId(id)),
            _ => Err(CampaignMonitorError::UnexpectedResponse { body }),
        }
    }

    async fn send(
        &self,
        auth: &ApiKey,
        campaign_id: &CampaignId,
        schedule: &Schedule,
    ) -> Result<(), CampaignMonitorError> {
        let request = self
            .http
            .post(self.url(&["campaigns", campaign_id.0.as_str(), "send.json"]))
            .basic_auth(auth.expose(), Some("x"))
            .json(schedule);

        self.execute(request).await?;
        Ok(())
    }

    async fn get_clients(&self, auth: &ApiKey) -> Result<Vec<ClientSummary>, CampaignMonitorError> {
        self.lookup(auth, &["clients.json"]).await
    }

    async fn get_templates(
        &self,
        auth: &ApiKey,
        client_id: &str,
    ) -> Result<Vec<TemplateSummary>, CampaignMonitorError> {
        self.lookup(auth, &["clients", client_id, "templates.json"])
            .await
    }

    async fn get_lists(
        &self,
        auth: &ApiKey,
        client_id: &str,
    ) -> Result<Vec<ListSummary>, CampaignMonitorError> {
        self.lookup(auth, &["clients", client_id, "lists.json"])
            .await
    }
}

fn parse_body(body: &str) -> Result<serde_json::Value, CampaignMonitorError> {
    serde_json::from_str(body).map_err(|_| CampaignMonitorError::UnexpectedResponse {
        body: body.to_string(),
    })
}

fn api_error(status: StatusCode, body: &str) -> CampaignMonitorError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(error) => CampaignMonitorError::Api {
            status: status.as_u16(),
            code: error.code,
            message: error.message,
        },
        Err(_) => CampaignMonitorError::Api {
            status: status.as_u16(),
            code: i64::from(status.as_u16()),
            message: body.to_string(),
        },
    }
}

/// Cache keys must separate accounts without holding the raw key.
fn key_fingerprint(auth: &ApiKey) -> String {
    let digest = Sha256::digest(auth.expose().as_bytes());
    hex::encode(&digest[..8])
}
