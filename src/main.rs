use anyhow::Result;
use clap::Parser;

use cm_notifier::app::Services;
use cm_notifier::cli::commands::lookup::{Lookup, LookupCommand};
use cm_notifier::cli::commands::publish::PublishCommand;
use cm_notifier::cli::commands::serve::ServeCommand;
use cm_notifier::cli::commands::settings::{SetSettingsCommand, ShowSettingsCommand};
use cm_notifier::cli::commands::Command;
use cm_notifier::cli::{Cli, Commands, SettingsAction};
use cm_notifier::notifier::{Post, PostStatusTransition};
use cm_notifier::{init_telemetry, NotifierConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = NotifierConfig::load_env_file() {
        eprintln!("⚠️  Ignoring unreadable .env file: {e}");
    }
    let config = NotifierConfig::load_from(&cli.config)?;
    init_telemetry(&config.observability)?;

    let services = Services::bootstrap(config)?;

    tokio::runtime::Runtime::new()?.block_on(async { run(cli.command, &services).await })
}

async fn run(command: Commands, services: &Services) -> Result<()> {
    match command {
        Commands::Serve { bind } => ServeCommand::new(services, bind).execute().await,
        Commands::Settings {
            action: SettingsAction::Show,
        } => ShowSettingsCommand::new(services).execute().await,
        Commands::Settings {
            action: SettingsAction::Set { assignments },
        } => SetSettingsCommand::new(services, assignments).execute().await,
        Commands::Clients => LookupCommand::new(services, Lookup::Clients).execute().await,
        Commands::Templates => LookupCommand::new(services, Lookup::Templates).execute().await,
        Commands::Lists => LookupCommand::new(services, Lookup::Lists).execute().await,
        Commands::Publish {
            title,
            excerpt,
            permalink,
            new_status,
            old_status,
            post_type,
        } => {
            let transition = PostStatusTransition {
                new_status,
                old_status,
                post: Post {
                    title,
                    excerpt,
                    post_type,
                    permalink,
                },
            };
            PublishCommand::new(services, transition).execute().await
        }
    }
}
