use anyhow::{bail, Result};

use crate::app::Services;
use crate::campaign_monitor::ApiKey;
use crate::cli::commands::Command;

#[derive(Debug, Clone, Copy)]
pub enum Lookup {
    Clients,
    Templates,
    Lists,
}

pub struct LookupCommand<'a> {
    services: &'a Services,
    lookup: Lookup,
}

impl<'a> LookupCommand<'a> {
    pub fn new(services: &'a Services, lookup: Lookup) -> Self {
        Self { services, lookup }
    }
}

impl Command for LookupCommand<'_> {
    async fn execute(&self) -> Result<()> {
        let record = self.services.settings.read().await?;
        let Some(api_key) = record.api_key.as_deref().filter(|key| !key.is_empty()) else {
            bail!("No API key saved. Run: cm-notifier settings set api_key=YOUR_KEY");
        };
        let auth = ApiKey::new(api_key);
        let api = &self.services.api;

        let rows: Vec<(String, String)> = match self.lookup {
            Lookup::Clients => api
                .get_clients(&auth)
                .await?
                .into_iter()
                .map(|c| (c.client_id, c.name))
                .collect(),
            Lookup::Templates | Lookup::Lists => {
                let Some(client_id) = record.client_id.as_deref().filter(|id| !id.is_empty()) else {
                    bail!("No client id saved. Find it with 'cm-notifier clients', then: cm-notifier settings set client_id=ID");
                };
                if matches!(self.lookup, Lookup::Templates) {
                    api.get_templates(&auth, client_id)
                        .await?
                        .into_iter()
                        .map(|t| (t.template_id, t.name))
                        .collect()
                } else {
                    api.get_lists(&auth, client_id)
                        .await?
                        .into_iter()
                        .map(|l| (l.list_id, l.name))
                        .collect()
                }
            }
        };

        if rows.is_empty() {
            println!("📋 Nothing found");
            return Ok(());
        }
        for (id, name) in rows {
            println!("   {id:<34} {name}");
        }
        Ok(())
    }
}
