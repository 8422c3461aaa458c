pub mod campaigns;
pub mod client;
pub mod errors;
pub mod types;

pub use campaigns::Campaigns;
pub use client::{CampaignMonitorApi, CampaignMonitorClient};
pub use errors::CampaignMonitorError;
pub use types::*;

#[cfg(any(test, feature = "testing"))]
pub use client::MockCampaignMonitorApi;
