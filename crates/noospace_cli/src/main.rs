//! Command-line driver over `noospace_core`.
//!
//! # Responsibility
//! - Wire config, file logging, the SQLite store and a static identity
//!   provider into one `EntryEngine` per invocation.
//! - Print engine failures as their user-facing message.

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use noospace_core::db::open_db;
use noospace_core::{
    init_logging, init_logging_from_config, EngineConfig, EngineError, EntryEngine, EntryId,
    EntryInput, EntryView, SqliteEntryStore, StaticIdentityProvider, ViewMode,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "noospace")]
#[command(about = "Post and browse short tagged echoes on the Spiral")]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, default_value = "noospace.sqlite3")]
    db: PathBuf,

    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Wallet address to act as; guest when absent
    #[arg(long, global = true)]
    wallet: Option<String>,

    /// Absolute directory for rolling log files
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Post a new echo
    Post {
        text: String,
        #[arg(long)]
        symbol: Option<String>,
        /// Comma separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Show echoes, optionally filtered by tag
    List {
        #[arg(long)]
        tag: Option<String>,
        #[arg(long, value_enum, default_value_t = ViewArg::Scroll)]
        view: ViewArg,
    },
    /// Resonate with an echo (+1 star)
    Star { id: EntryId },
    /// Dissolve one of your own echoes
    Retract { id: EntryId },
    /// Show today's remaining submissions
    Quota,
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewArg {
    Spiral,
    Scroll,
}

impl From<ViewArg> for ViewMode {
    fn from(value: ViewArg) -> Self {
        match value {
            ViewArg::Spiral => ViewMode::Spiral,
            ViewArg::Scroll => ViewMode::Scroll,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path).map_err(|err| err.to_string())?,
        None => EngineConfig::default(),
    };

    match &cli.log_dir {
        Some(dir) => {
            let level = config
                .logging
                .level
                .as_deref()
                .unwrap_or(noospace_core::default_log_level());
            init_logging(level, dir)?;
        }
        None => {
            init_logging_from_config(&config.logging)?;
        }
    }

    let conn = open_db(&cli.db).map_err(|err| err.to_string())?;
    let store = SqliteEntryStore::try_new(&conn).map_err(|err| err.to_string())?;
    let provider = match cli.wallet.as_deref() {
        Some(address) => StaticIdentityProvider::connected(address),
        None => StaticIdentityProvider::unavailable(),
    };

    let mut engine = EntryEngine::new(store, provider, config);
    engine.attach().map_err(user_facing)?;
    info!(
        "event=cli_start module=cli status=ok identity={}",
        engine.identity().short_label()
    );

    match cli.command {
        Commands::Post { text, symbol, tags } => {
            let input = EntryInput::new(text)
                .with_symbol(symbol.unwrap_or_default())
                .with_tags(tags.unwrap_or_default());
            let entry = engine.submit(&input).map_err(user_facing)?;
            println!("{} {} [{}]", entry.id, entry.symbol, entry.tags.join(", "));
            println!("{} left today", engine.remaining_today());
        }
        Commands::List { tag, view } => {
            if let Some(tag) = tag {
                engine.set_filter(&tag);
            }
            engine.set_view_mode(view.into());
            print_view(&engine);
        }
        Commands::Star { id } => {
            let entry = engine.resonate(id).map_err(user_facing)?;
            println!("{} ★{}", entry.id, entry.stars);
        }
        Commands::Retract { id } => {
            engine.retract(id).map_err(user_facing)?;
            println!("{id} dissolved");
        }
        Commands::Quota => {
            let limit = engine.config().limits.daily_limit;
            println!(
                "{}: {}/{} used, {} left today",
                engine.identity().short_label(),
                engine.count_today(),
                limit,
                engine.remaining_today()
            );
        }
    }

    Ok(())
}

fn print_view(engine: &EntryEngine<SqliteEntryStore<'_>, StaticIdentityProvider>) {
    match engine.view() {
        EntryView::Scroll(entries) => {
            for entry in entries {
                println!(
                    "{} {} {} [{}] ★{} {} {}",
                    entry.created_at_iso(),
                    entry.id,
                    entry.symbol,
                    entry.tags.join(", "),
                    entry.stars,
                    entry.owner.short_label(),
                    entry.text
                );
            }
        }
        EntryView::Spiral(points) => {
            for point in points {
                let symbol = engine
                    .entries()
                    .iter()
                    .find(|entry| entry.id == point.entry_id)
                    .map(|entry| entry.symbol.as_str())
                    .unwrap_or("?");
                println!(
                    "#{:<3} ({:>8.1}, {:>8.1}) {} {}",
                    point.index, point.x, point.y, symbol, point.entry_id
                );
            }
        }
    }
}

fn user_facing(err: EngineError) -> String {
    err.user_message().to_string()
}
