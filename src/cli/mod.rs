use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "cm-notifier")]
#[command(about = "Send a Campaign Monitor campaign when a blog post is first published")]
#[command(long_about = "cm-notifier listens for post status transitions from your blog and, on a post's \
                       first publish, creates a campaign from your Campaign Monitor template and sends it \
                       to the chosen list. Start with 'cm-notifier settings set' then 'cm-notifier serve'.")]
pub struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = "cm-notifier.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP host: post-status hook and admin settings page
    Serve {
        /// Listen address, overriding admin.bind_address
        #[arg(long, help = "Address to listen on, e.g. 127.0.0.1:8787")]
        bind: Option<String>,
    },
    /// Inspect or edit the stored notifier settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// List the clients on the account (to find your client id)
    Clients,
    /// List the templates of the configured client
    Templates,
    /// List the subscriber lists of the configured client
    Lists,
    /// Run a post status transition through the notification workflow
    Publish {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        excerpt: String,
        #[arg(long)]
        permalink: String,
        #[arg(long, default_value = "publish")]
        new_status: String,
        #[arg(long, default_value = "draft")]
        old_status: String,
        #[arg(long, default_value = "post")]
        post_type: String,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the stored settings (api key masked)
    Show,
    /// Merge FIELD=VALUE pairs into the stored settings; empty values are ignored
    Set {
        #[arg(value_parser = parse_assignment, required = true, help = "e.g. api_key=abc123 chosen_list=xyz")]
        assignments: Vec<(String, String)>,
    },
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    Ok((field.to_string(), value.to_string()))
}
