use anyhow::{Context, Result};
use tokio::net::TcpListener;

use crate::app::Services;
use crate::cli::commands::Command;
use crate::server;

pub struct ServeCommand<'a> {
    services: &'a Services,
    bind: Option<String>,
}

impl<'a> ServeCommand<'a> {
    pub fn new(services: &'a Services, bind: Option<String>) -> Self {
        Self { services, bind }
    }
}

impl Command for ServeCommand<'_> {
    async fn execute(&self) -> Result<()> {
        let address = self
            .bind
            .clone()
            .unwrap_or_else(|| self.services.config.admin.bind_address.clone());
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind {address}"))?;

        self.services.notifier.start();
        println!("📬 cm-notifier listening on http://{address}");
        if self.services.notifier.is_running() {
            println!("   → Notifier: subscribed to post status transitions");
        }
        println!("   → Hook: POST /hooks/post-status");
        println!("   → Admin: GET /admin");

        let result = server::serve(listener, self.services.app_state()).await;
        self.services.notifier.stop();
        result
    }
}
