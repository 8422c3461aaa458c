use serde::{Deserialize, Serialize};

/// Operator settings for the notifier, persisted as one JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Sender display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replyto_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chosen_list: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chosen_template: Option<String>,
}

impl SettingsRecord {
    pub const FIELDS: [&'static str; 8] = [
        "api_key",
        "client_id",
        "from",
        "from_email",
        "replyto_email",
        "confirmation_email",
        "chosen_list",
        "chosen_template",
    ];

    /// A record without a usable api key disables notifications.
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }

    /// Set a field by its stored name. Returns false for unknown names.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> bool {
        match self.slot_mut(field) {
            Some(slot) => {
                *slot = Some(value.into());
                true
            }
            None => false,
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        let slot = match field {
            "api_key" => &self.api_key,
            "client_id" => &self.client_id,
            "from" => &self.from,
            "from_email" => &self.from_email,
            "replyto_email" => &self.replyto_email,
            "confirmation_email" => &self.confirmation_email,
            "chosen_list" => &self.chosen_list,
            "chosen_template" => &self.chosen_template,
            _ => return None,
        };
        slot.as_deref()
    }

    fn slot_mut(&mut self, field: &str) -> Option<&mut Option<String>> {
        match field {
            "api_key" => Some(&mut self.api_key),
            "client_id" => Some(&mut self.client_id),
            "from" => Some(&mut self.from),
            "from_email" => Some(&mut self.from_email),
            "replyto_email" => Some(&mut self.replyto_email),
            "confirmation_email" => Some(&mut self.confirmation_email),
            "chosen_list" => Some(&mut self.chosen_list),
            "chosen_template" => Some(&mut self.chosen_template),
            _ => None,
        }
    }

    /// Field value or empty string, as sent in campaign payloads.
    pub fn field_or_empty(&self, field: &str) -> String {
        self.get(field).unwrap_or_default().to_string()
    }
}
