use anyhow::Result;

use crate::app::Services;
use crate::cli::commands::Command;
use crate::settings::{SettingsRecord, FIELD_PREFIX};

pub struct ShowSettingsCommand<'a> {
    services: &'a Services,
}

impl<'a> ShowSettingsCommand<'a> {
    pub fn new(services: &'a Services) -> Self {
        Self { services }
    }
}

impl Command for ShowSettingsCommand<'_> {
    async fn execute(&self) -> Result<()> {
        let record = self.services.settings.read().await?;

        println!("⚙️  Notifier settings");
        for field in SettingsRecord::FIELDS {
            let value = match (field, record.get(field)) {
                ("api_key", Some(key)) => mask(key),
                (_, Some(value)) => value.to_string(),
                (_, None) => "(not set)".to_string(),
            };
            println!("   {field:<20} {value}");
        }
        if !record.is_configured() {
            println!();
            println!("⚠️  No API key saved - notifications are disabled");
            println!("   💡 cm-notifier settings set api_key=YOUR_KEY client_id=YOUR_CLIENT");
        }
        Ok(())
    }
}

pub struct SetSettingsCommand<'a> {
    services: &'a Services,
    assignments: Vec<(String, String)>,
}

impl<'a> SetSettingsCommand<'a> {
    pub fn new(services: &'a Services, assignments: Vec<(String, String)>) -> Self {
        Self {
            services,
            assignments,
        }
    }

    /// Accept fields with or without the form prefix.
    fn prefixed(&self) -> Vec<(String, String)> {
        self.assignments
            .iter()
            .map(|(field, value)| {
                let field = if field.starts_with(FIELD_PREFIX) {
                    field.clone()
                } else {
                    format!("{FIELD_PREFIX}{field}")
                };
                (field, value.clone())
            })
            .collect()
    }
}

impl Command for SetSettingsCommand<'_> {
    async fn execute(&self) -> Result<()> {
        let before = self.services.settings.read().await?;
        let after = self.services.settings.write(self.prefixed()).await?;

        let changed: Vec<&str> = SettingsRecord::FIELDS
            .into_iter()
            .filter(|field| before.get(field) != after.get(field))
            .collect();

        if changed.is_empty() {
            println!("ℹ️  Nothing changed (empty values and unknown fields are ignored)");
        } else {
            println!("✅ Saved! Updated: {}", changed.join(", "));
        }
        Ok(())
    }
}

/// Keys too short to spare four characters are hidden entirely.
fn mask(key: &str) -> String {
    if key.chars().count() <= 8 {
        return "****".to_string();
    }
    let visible: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{visible}")
}
