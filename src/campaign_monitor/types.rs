use serde::{Deserialize, Serialize};
use std::fmt;

/// Account API key, sent as the basic-auth username.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Identifier returned by campaign creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(pub String);

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of `POST /campaigns/{clientId}/fromtemplate.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CampaignInfo {
    pub subject: String,
    pub name: String,
    pub from_name: String,
    pub from_email: String,
    pub reply_to: String,
    #[serde(rename = "ListIDs")]
    pub list_ids: Vec<String>,
    #[serde(rename = "TemplateID")]
    pub template_id: String,
    pub template_content: TemplateContent,
}

/// Values for the template's editable regions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateContent {
    pub singlelines: Vec<SingleLine>,
    pub multilines: Vec<MultiLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SingleLine {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MultiLine {
    pub content: String,
}

/// Body of `POST /campaigns/{campaignId}/send.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Schedule {
    pub confirmation_email: String,
    pub send_date: String,
}

impl Schedule {
    pub const IMMEDIATELY: &'static str = "immediately";

    pub fn immediately(confirmation_email: impl Into<String>) -> Self {
        Self {
            confirmation_email: confirmation_email.into(),
            send_date: Self::IMMEDIATELY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSummary {
    #[serde(rename = "ClientID")]
    pub client_id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSummary {
    #[serde(rename = "TemplateID")]
    pub template_id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "PreviewURL", default)]
    pub preview_url: Option<String>,
    #[serde(rename = "ScreenshotURL", default)]
    pub screenshot_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSummary {
    #[serde(rename = "ListID")]
    pub list_id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// Error body the API returns with non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(rename = "Code")]
    pub code: i64,
    #[serde(rename = "Message")]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_campaign_info_uses_api_field_names() {
        let info = CampaignInfo {
            subject: "Hello".to_string(),
            name: "Hello".to_string(),
            from_name: "Alice".to_string(),
            from_email: "alice@example.com".to_string(),
            reply_to: "alice@example.com".to_string(),
            list_ids: vec!["list-1".to_string()],
            template_id: "tpl-1".to_string(),
            template_content: TemplateContent {
                singlelines: vec![SingleLine {
                    content: "Hello".to_string(),
                    href: Some("https://blog.example.com/hello".to_string()),
                }],
                multilines: vec![MultiLine {
                    content: "Excerpt".to_string(),
                }],
            },
        };

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["ListIDs"], json!(["list-1"]));
        assert_eq!(value["TemplateID"], json!("tpl-1"));
        assert_eq!(value["ReplyTo"], json!("alice@example.com"));
        assert_eq!(
            value["TemplateContent"]["Singlelines"][0]["Href"],
            json!("https://blog.example.com/hello")
        );
        assert_eq!(
            value["TemplateContent"]["Multilines"][0]["Content"],
            json!("Excerpt")
        );
    }

    #[test]
    fn test_schedule_sends_immediately() {
        let value = serde_json::to_value(Schedule::immediately("ops@example.com")).unwrap();
        assert_eq!(
            value,
            json!({"ConfirmationEmail": "ops@example.com", "SendDate": "immediately"})
        );
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("secret-key");
        assert_eq!(format!("{:?}", key), "ApiKey(***)");
        assert_eq!(key.expose(), "secret-key");
    }

    #[test]
    fn test_template_summary_tolerates_missing_urls() {
        let template: TemplateSummary =
            serde_json::from_value(json!({"TemplateID": "t1", "Name": "Basic"})).unwrap();
        assert_eq!(template.template_id, "t1");
        assert!(template.preview_url.is_none());
    }
}
