use thiserror::Error;

#[derive(Debug, Error)]
pub enum CampaignMonitorError {
    #[error("Campaign Monitor request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Campaign Monitor API error {code} (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: i64,
        message: String,
    },

    /// A 2xx response whose body was not the expected shape
    #[error("unexpected Campaign Monitor response: {body}")]
    UnexpectedResponse { body: String },

    #[error("no campaign bound; set a campaign id before sending")]
    NoCampaignBound,

    #[error("invalid Campaign Monitor base url: {0}")]
    InvalidBaseUrl(String),
}

impl CampaignMonitorError {
    /// Credentials rejected (Campaign Monitor answers 401 for a bad key or client).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CampaignMonitorError::Api { status: 401, .. })
    }
}
