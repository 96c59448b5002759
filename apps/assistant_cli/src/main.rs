use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    config::DEFAULT_SETTINGS_FILE, example_query, load_settings_from, ApiClient, ApiKeyManager,
    ClientSettings, Notification, NotificationLevel, Notifier, SearchController, SettingsController,
    SyncedFileManager,
};
use shared::domain::{ContentSource, Modality, SubscriptionOperation};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "assistant", about = "Command line client for the assistant backend")]
struct Cli {
    #[arg(long, global = true)]
    server_url: Option<String>,
    #[arg(long, global = true)]
    token: Option<String>,
    #[arg(long, global = true, default_value = DEFAULT_SETTINGS_FILE)]
    settings: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the indexed knowledge base.
    Search { query: Vec<String> },
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
    /// Update the display name.
    Name { name: String },
    Phone {
        #[command(subcommand)]
        action: PhoneCommand,
    },
    Subscription { action: SubscriptionAction },
    /// Select the model used for a modality.
    Model { modality: Modality, id: i64 },
    /// Save the Notion integration token.
    Notion { token: String },
    Content {
        #[command(subcommand)]
        action: ContentCommand,
    },
    Files {
        #[command(subcommand)]
        action: FilesCommand,
    },
    Keys {
        #[command(subcommand)]
        action: KeysCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    Show,
}

#[derive(Subcommand, Debug)]
enum PhoneCommand {
    /// Send a code to the number, then read it from stdin and verify it.
    Setup { number: String },
    Disconnect,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SubscriptionAction {
    Cancel,
    Resubscribe,
    Trial,
}

#[derive(Subcommand, Debug)]
enum ContentCommand {
    Sync { source: ContentSource },
    Disconnect { source: ContentSource },
}

#[derive(Subcommand, Debug)]
enum FilesCommand {
    List {
        #[arg(long)]
        filter: Option<String>,
    },
    Delete {
        name: String,
    },
    /// Delete every synced file matching the filter.
    DeleteAll {
        #[arg(long)]
        filter: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    List,
    Create,
    Delete { token: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let cli = Cli::parse();

    let mut settings = load_settings_from(&cli.settings);
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    if let Some(token) = cli.token {
        settings.api_token = Some(token);
    }
    let api = Arc::new(ApiClient::from_settings(&settings).context("invalid client settings")?);
    info!(server_url = api.server_url(), "using backend");

    let notifier = Notifier::new();
    let mut notes = notifier.subscribe();

    let outcome = run(cli.command, api, notifier, &settings).await;
    print_notifications(&mut notes);
    outcome
}

async fn run(
    command: Command,
    api: Arc<ApiClient>,
    notifier: Notifier,
    settings: &ClientSettings,
) -> Result<()> {
    match command {
        Command::Search { query } => search(api, query.join(" "), settings).await?,
        Command::Files { action } => files(api, action).await?,
        Command::Keys { action } => keys(api, action).await?,
        command => {
            let mut controller = SettingsController::load(api, notifier)
                .await
                .context("failed to load user settings")?;
            settings_action(&mut controller, command).await?;
        }
    }
    Ok(())
}

async fn search(api: Arc<ApiClient>, query: String, settings: &ClientSettings) -> Result<()> {
    if query.trim().is_empty() {
        println!("Try: {}", example_query());
        return Ok(());
    }

    let mut controller = SearchController::with_debounce(api, settings.search_debounce());
    controller.set_query(query);

    let results = tokio::time::timeout(
        settings.search_debounce() + settings.request_timeout(),
        controller.outcome(),
    )
    .await
    .context("search timed out")??;

    if results.is_empty() {
        println!("No results");
    }
    for result in results {
        let preview = result.entry.lines().next().unwrap_or_default();
        println!("{:.3}  {}  {}", result.score, result.display_name(), preview);
    }
    Ok(())
}

async fn settings_action(controller: &mut SettingsController, command: Command) -> Result<()> {
    match command {
        Command::Settings {
            action: SettingsCommand::Show,
        } => {
            let snapshot = controller.snapshot();
            println!("{}", serde_json::to_string_pretty(&*snapshot)?);
            println!("phone verification: {}", controller.phone().state());
        }
        Command::Name { name } => controller.save_name(&name).await?,
        Command::Phone { action } => match action {
            PhoneCommand::Setup { number } => {
                controller.set_phone_number(Some(number))?;
                controller.send_otp().await?;
                let code = prompt("Enter the 6-digit code: ").await?;
                controller.set_otp(code)?;
                controller.verify_otp().await?;
            }
            PhoneCommand::Disconnect => controller.disconnect_phone().await?,
        },
        Command::Subscription { action } => match action {
            SubscriptionAction::Cancel => {
                controller
                    .set_subscription(SubscriptionOperation::Cancel)
                    .await?
            }
            SubscriptionAction::Resubscribe => {
                controller
                    .set_subscription(SubscriptionOperation::Resubscribe)
                    .await?
            }
            SubscriptionAction::Trial => controller.enable_free_trial().await?,
        },
        Command::Model { modality, id } => controller.update_model(modality, id).await?,
        Command::Notion { token } => controller.save_notion_token(&token).await?,
        Command::Content { action } => match action {
            ContentCommand::Sync { source } => controller.sync_content(source).await?,
            ContentCommand::Disconnect { source } => controller.disconnect_content(source).await?,
        },
        Command::Search { .. } | Command::Files { .. } | Command::Keys { .. } => {}
    }
    Ok(())
}

async fn files(api: Arc<ApiClient>, action: FilesCommand) -> Result<()> {
    let mut manager = SyncedFileManager::new(api);
    manager.refresh().await?;

    match action {
        FilesCommand::List { filter } => {
            manager.set_filter(filter.unwrap_or_default());
            for name in manager.filtered() {
                println!("{name}");
            }
        }
        FilesCommand::Delete { name } => {
            manager.delete_file(&name).await?;
            println!("deleted {name}");
        }
        FilesCommand::DeleteAll { filter } => {
            manager.set_filter(filter.unwrap_or_default());
            let deleted = manager.delete_selected().await?;
            println!("deleted {} file(s)", deleted.len());
        }
    }
    Ok(())
}

async fn keys(api: Arc<ApiClient>, action: KeysCommand) -> Result<()> {
    let mut manager = ApiKeyManager::new(api);

    match action {
        KeysCommand::List => {
            manager.list().await?;
            for key in manager.keys() {
                println!("{}  {}", key.name, key.token);
            }
        }
        KeysCommand::Create => {
            let key = manager.generate().await?;
            println!("{}  {}", key.name, key.token);
        }
        KeysCommand::Delete { token } => {
            manager.delete(&token).await?;
            println!("deleted key");
        }
    }
    Ok(())
}

async fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    std::io::Write::flush(&mut std::io::stdout())?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    match lines.next_line().await? {
        Some(line) => Ok(line.trim().to_string()),
        None => bail!("no code entered"),
    }
}

fn print_notifications(rx: &mut broadcast::Receiver<Notification>) {
    while let Ok(note) = rx.try_recv() {
        let marker = match note.level {
            NotificationLevel::Info => "*",
            NotificationLevel::Error => "!",
        };
        if note.description.is_empty() {
            eprintln!("{marker} {}", note.title);
        } else {
            eprintln!("{marker} {}: {}", note.title, note.description);
        }
    }
}
