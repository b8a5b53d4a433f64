//! Quotebook command-line front end.
//!
//! # Responsibility
//! - Act as the presentation layer over `quotebook_core`.
//! - Map core errors to user-facing messages; sync failures never abort.

mod render;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::info;
use quotebook_core::{
    core_version, init_logging, load_config, start_sync, HttpRemoteSource, MemoryKeyValueStore,
    QuoteChange, QuoteService, QuotebookConfig, ServiceError, ServiceOptions,
    SqliteKeyValueStore, SyncEvent,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

type CliService = QuoteService<SqliteKeyValueStore, MemoryKeyValueStore>;

#[derive(Debug, Parser)]
#[command(name = "quotebook")]
#[command(version)]
#[command(about = "Keep a list of quotes, filter it by category and sync in remote ones")]
struct Cli {
    /// Path to the TOML config file (default: ./quotebook.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the SQLite store, overriding the config file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show a random quote from the current filter
    Show,

    /// Add a quote
    Add {
        /// Quote text
        text: String,
        /// Quote category
        category: String,
    },

    /// List quotes, by default under the saved filter
    List {
        /// Category to list instead of the saved filter ("all" for everything)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List distinct categories in first-seen order
    Categories,

    /// Save the category filter ("all" clears it)
    Filter {
        category: String,
    },

    /// Append quotes from a JSON file
    Import {
        file: PathBuf,
    },

    /// Write all quotes to a JSON file
    Export {
        file: PathBuf,
    },

    /// Run one remote sync cycle
    Sync,

    /// Sync periodically until interrupted
    Watch {
        /// Seconds between cycles, overriding the config file
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Print the CLI and core versions
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Commands::Version = cli.command {
        println!(
            "quotebook {} (core {})",
            env!("CARGO_PKG_VERSION"),
            core_version()
        );
        return Ok(());
    }

    let config = resolve_config(&cli)?;

    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(config.log_level(), log_dir) {
            bail!("failed to initialize logging: {err}");
        }
    }

    let store = SqliteKeyValueStore::open(&config.database_path).with_context(|| {
        format!(
            "failed to open quote store `{}`",
            config.database_path.display()
        )
    })?;
    let mut service = QuoteService::open(
        store,
        MemoryKeyValueStore::new(),
        ServiceOptions {
            seed_starter_quotes: config.seed_starter_quotes,
        },
    )?;

    match cli.command {
        Commands::Show => match service.show_random()? {
            Some(quote) => render::print_quote(&quote),
            None => println!("No quotes yet. Add one with `quotebook add`."),
        },
        Commands::Add { text, category } => {
            let quote = service.add_quote(&text, &category)?;
            println!("Quote added to \"{}\".", quote.category);
        }
        Commands::List { category } => list(&service, category.as_deref()),
        Commands::Categories => {
            render::print_categories(&service.categories(), &service.selected_category())
        }
        Commands::Filter { category } => match service.select_category(&category) {
            Ok(selected) => println!("Filter set to \"{selected}\"."),
            Err(ServiceError::UnknownCategory(value)) => {
                bail!("no quotes in category \"{value}\"; run `quotebook categories`")
            }
            Err(err) => return Err(err.into()),
        },
        Commands::Import { file } => {
            let report = service
                .import_file(&file)
                .with_context(|| format!("failed to import `{}`", file.display()))?;
            println!(
                "Imported {} quote(s); skipped {} malformed entr{}.",
                report.added,
                report.skipped,
                if report.skipped == 1 { "y" } else { "ies" }
            );
        }
        Commands::Export { file } => {
            let written = service
                .export_file(&file)
                .with_context(|| format!("failed to export to `{}`", file.display()))?;
            println!("Exported {written} quote(s) to {}.", file.display());
        }
        Commands::Sync => sync_once(&mut service, &config).await?,
        Commands::Watch { interval } => {
            let interval = interval
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.sync_interval());
            watch(service, &config, interval).await?;
        }
        Commands::Version => {}
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> anyhow::Result<QuotebookConfig> {
    let mut config = load_config(cli.config.as_deref())?.unwrap_or_default();
    if let Some(db) = &cli.db {
        config.database_path = db.clone();
    }
    Ok(config)
}

fn build_source(config: &QuotebookConfig) -> anyhow::Result<HttpRemoteSource> {
    let source = HttpRemoteSource::with_options(
        config.remote_endpoint.clone(),
        config.remote_category.clone(),
        config.remote_batch_size,
        config.fetch_timeout(),
    )?;
    Ok(source)
}

fn list(service: &CliService, category: Option<&str>) {
    let selection = category
        .map(str::to_string)
        .unwrap_or_else(|| service.selected_category());
    let quotes = quotebook_core::filter_quotes(service.quotes(), &selection);
    render::print_list(&selection, &quotes);
}

async fn sync_once(service: &mut CliService, config: &QuotebookConfig) -> anyhow::Result<()> {
    let source = build_source(config)?;
    match service.reconcile(&source).await {
        Ok(0) => println!("Already up to date."),
        Ok(added) => println!("Synced {added} new quote(s) from the server."),
        Err(ServiceError::Sync(err)) => eprintln!("Sync skipped: {err}"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

async fn watch(
    mut service: CliService,
    config: &QuotebookConfig,
    interval: Duration,
) -> anyhow::Result<()> {
    service.subscribe(|change, quotes| {
        if let QuoteChange::Merged { added } = change {
            println!("Synced {added} new quote(s); {} total.", quotes.len());
        }
    });

    let source = Arc::new(build_source(config)?);
    let shared = service.into_shared();
    let mut handle = start_sync(Arc::clone(&shared), source, interval)?;
    println!(
        "Syncing every {}s. Press Ctrl-C to stop.",
        interval.as_secs()
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            signal = &mut ctrl_c => {
                signal.context("failed to listen for Ctrl-C")?;
                break;
            }
            event = handle.events().recv() => match event {
                Some(SyncEvent::Failed(err)) => eprintln!("Sync skipped: {err}"),
                // Merges are announced by the change listener.
                Some(SyncEvent::Synced { .. }) => {}
                None => break,
            },
        }
    }
    handle.stop().await;
    let total = shared.lock().await.quotes().len();
    info!("event=watch_stop module=cli status=ok total={total}");
    println!("Stopped with {total} quote(s) stored.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{resolve_config, Cli, Commands};
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_positional_fields() {
        let cli = Cli::parse_from(["quotebook", "add", "Stay curious.", "Life"]);
        match cli.command {
            Commands::Add { text, category } => {
                assert_eq!(text, "Stay curious.");
                assert_eq!(category, "Life");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_version_subcommand() {
        let cli = Cli::parse_from(["quotebook", "version"]);
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn db_flag_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("quotebook.toml");
        std::fs::write(&config_path, "database_path = \"from-file.sqlite3\"\n").unwrap();

        let config_arg = config_path.to_str().unwrap();
        let cli = Cli::parse_from(["quotebook", "--config", config_arg, "categories"]);
        assert_eq!(
            resolve_config(&cli).unwrap().database_path,
            PathBuf::from("from-file.sqlite3")
        );

        let cli = Cli::parse_from([
            "quotebook",
            "--config",
            config_arg,
            "--db",
            "override.sqlite3",
            "list",
        ]);
        assert_eq!(
            resolve_config(&cli).unwrap().database_path,
            PathBuf::from("override.sqlite3")
        );
    }
}
