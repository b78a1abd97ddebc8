use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    AutoConfirm, Confirm, DeleteOutcome, HttpContactStore, Phonebook, SubmitOutcome,
};
use tracing_subscriber::EnvFilter;

mod prompt;
mod render;
mod settings;
mod shell;

use prompt::StdinPrompt;
use settings::{load_settings, DEFAULT_CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(name = "phonebook", about = "Keep a phonebook in sync with a persons REST collection")]
struct Cli {
    /// Base url of the server exposing `/persons`.
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Answer yes to every confirmation.
    #[arg(long, short = 'y')]
    yes: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List {
        #[arg(long)]
        filter: Option<String>,
    },
    Add {
        name: String,
        number: String,
    },
    Delete {
        /// Exact name, or id.
        target: String,
    },
    Shell,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(&cli.config);
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }

    let store = HttpContactStore::with_timeout(&settings.base_url, settings.request_timeout())
        .with_context(|| format!("cannot use base url '{}'", settings.base_url))?;
    let phonebook = Phonebook::with_options(store, settings.phonebook_options());
    phonebook.load().await?;

    let prompt = StdinPrompt::new();
    let auto_yes = AutoConfirm(true);
    let confirm: &dyn Confirm = if cli.yes { &auto_yes } else { &prompt };

    let ok = match cli.command {
        Command::List { filter } => {
            if let Some(filter) = filter {
                phonebook.set_filter(filter).await;
            }
            render::contacts(&phonebook.visible().await);
            true
        }
        Command::Add { name, number } => {
            let outcome = phonebook.submit(name, number, confirm).await?;
            show_notification(&phonebook).await;
            render::submit_outcome(&outcome);
            !matches!(
                outcome,
                SubmitOutcome::CreateFailed | SubmitOutcome::ConflictRemoved { .. }
            )
        }
        Command::Delete { target } => {
            let contact = phonebook.resolve(&target).await?;
            let outcome = phonebook.delete(&contact.id, confirm).await;
            render::delete_outcome(&outcome, &contact.name);
            outcome != DeleteOutcome::Failed
        }
        Command::Shell => {
            shell::run(&phonebook, &prompt).await?;
            true
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn show_notification(phonebook: &Phonebook<HttpContactStore>) {
    if let Some(notification) = phonebook.notification().await {
        render::notification(&notification);
    }
}
