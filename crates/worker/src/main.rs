//! `stalewatch-worker` -- stateless staleness-reminder pass.
//!
//! Invoked by an external scheduler, performs exactly one pipeline pass,
//! prints the structured run summary as JSON on stdout, and exits.
//! The exit status is non-zero only for global failures (feed,
//! inventory, directory auth, budget exceeded); per-host failures are
//! reported in the summary and exit zero.
//!
//! Configuration is environment-sourced; see
//! [`WorkerConfig::from_env`](stalewatch_worker::WorkerConfig::from_env)
//! for the variable table and `SMTP_HOST` for the optional email
//! fallback.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stalewatch_directory::HttpDeviceDirectory;
use stalewatch_feeds::HttpVersionFeed;
use stalewatch_inventory::HttpFleetInventory;
use stalewatch_notify::{Chat, Email, EmailConfig, ReminderNotifier};
use stalewatch_worker::{run_with_budget, RunOptions, WorkerConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stalewatch_worker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match WorkerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Configuration error");
            std::process::exit(2);
        }
    };

    let feed = HttpVersionFeed::new(config.feed_urls.clone());
    let inventory = HttpFleetInventory::new(
        config.inventory_url.clone(),
        config.inventory_token.clone(),
        config.inventory_query_id.clone(),
    );
    let directory = HttpDeviceDirectory::new(
        config.directory_url.clone(),
        config.directory_api_key.clone(),
    );

    let chat = Chat::new(config.chat_api_url.clone(), config.chat_bot_token.clone());
    let mut notifier = ReminderNotifier::new(chat);
    if let Some(email_config) = EmailConfig::from_env() {
        tracing::info!(smtp_host = %email_config.smtp_host, "Email fallback enabled");
        notifier = notifier.with_email_fallback(Email::new(email_config));
    }

    let opts = RunOptions {
        run_id: uuid::Uuid::new_v4().to_string(),
        max_concurrent_hosts: config.max_concurrent_hosts,
    };

    match run_with_budget(
        &feed,
        &inventory,
        &directory,
        &notifier,
        &opts,
        config.run_timeout,
    )
    .await
    {
        Ok(summary) => {
            let json = serde_json::to_string_pretty(&summary)
                .expect("RunSummary is always serialisable");
            println!("{json}");
        }
        Err(e) => {
            tracing::error!(run_id = %opts.run_id, error = %e, "Run aborted");
            std::process::exit(1);
        }
    }
}
