//! Parley CLI entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, opens the selected storage backend, then
//! dispatches to the appropriate command handler.

mod chat;
mod cli;
mod conversations;
mod report;
mod store_select;

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use parley_infra::config::load_engine_config;
use parley_infra::filesystem::FsConversationStore;
use parley_infra::sqlite::{DatabasePool, SqliteConversationStore};

use cli::{Backend, Cli, Commands};
use store_select::AnyStore;

fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os("PARLEY_DATA_DIR").map(PathBuf::from))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".parley")
        })
}

async fn open_pool(data_dir: &Path) -> anyhow::Result<DatabasePool> {
    let url = format!("sqlite://{}?mode=rwc", data_dir.join("parley.db").display());
    Ok(DatabasePool::new(&url).await?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info,parley=debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let data_dir = resolve_data_dir(cli.data_dir.clone());
    std::fs::create_dir_all(&data_dir)?;
    let config = load_engine_config(&data_dir).await;

    let mut pool: Option<DatabasePool> = None;
    let store = match cli.backend {
        Backend::Sqlite => {
            let opened = open_pool(&data_dir).await?;
            let store = SqliteConversationStore::new(opened.clone());
            store.ensure_indexes().await?;
            pool = Some(opened);
            AnyStore::Sqlite(store)
        }
        Backend::Fs => {
            AnyStore::Fs(FsConversationStore::open(data_dir.join("conversations")).await?)
        }
    };

    match cli.command {
        Commands::Init {
            id,
            title,
            model,
            system,
            owner,
            overwrite,
        } => {
            conversations::init(
                &store,
                &config,
                &id,
                title.as_deref(),
                model.as_deref(),
                system.as_deref(),
                owner.as_deref(),
                overwrite,
            )
            .await?;
        }

        Commands::List { owner } => {
            conversations::list(&store, owner.as_deref()).await?;
        }

        Commands::Chat { id } => {
            chat::run(store, &config, &id).await?;
        }

        Commands::Rename { id, title } => {
            conversations::rename(&store, &id, &title).await?;
        }

        Commands::Delete { id } => {
            conversations::delete(&store, &id).await?;
        }

        Commands::Preview { id } => {
            conversations::preview(store, &id).await?;
        }

        Commands::Claim { id, owner } => {
            conversations::claim(store, &id, &owner).await?;
        }

        Commands::Report {
            description,
            contact,
            submitter,
            attachments,
        } => {
            let report_pool = match &pool {
                Some(pool) => pool.clone(),
                None => {
                    let opened = open_pool(&data_dir).await?;
                    pool = Some(opened.clone());
                    opened
                }
            };
            report::submit(
                report_pool,
                &data_dir,
                &config,
                description,
                contact,
                submitter,
                attachments,
            )
            .await?;
        }
    }

    if let Some(pool) = pool {
        pool.close().await;
    }
    Ok(())
}
