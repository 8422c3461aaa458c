use anyhow::Result;

use crate::app::Services;
use crate::cli::commands::Command;
use crate::notifier::{NotificationOutcome, PostStatusTransition};

pub struct PublishCommand<'a> {
    services: &'a Services,
    transition: PostStatusTransition,
}

impl<'a> PublishCommand<'a> {
    pub fn new(services: &'a Services, transition: PostStatusTransition) -> Self {
        Self {
            services,
            transition,
        }
    }
}

impl Command for PublishCommand<'_> {
    async fn execute(&self) -> Result<()> {
        println!(
            "📝 '{}': {} → {}",
            self.transition.post.title, self.transition.old_status, self.transition.new_status
        );

        match self.services.notifier.workflow().handle(&self.transition).await {
            NotificationOutcome::Sent { campaign_id } => {
                println!("✅ Campaign {campaign_id} created and sent");
            }
            NotificationOutcome::Skipped(reason) => {
                println!("⏭️  Skipped: {reason:?}");
            }
            NotificationOutcome::CreateFailed => {
                println!("❌ Campaign could not be created (run with RUST_LOG=debug for details)");
            }
            NotificationOutcome::SendFailed { campaign_id } => {
                println!("❌ Campaign {campaign_id} was created but not sent");
            }
        }
        Ok(())
    }
}
