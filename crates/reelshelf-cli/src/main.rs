use clap::{ArgAction, Parser, Subcommand};
use commands::{clear, config, films, progress, watchlist, Env};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "reelshelf")]
#[command(about = "ReelShelf - Your watchlist, your progress, and the film catalog in one place")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage your watchlist
    #[command(long_about = "Add, remove, annotate and list the titles on your watchlist. Every change is saved immediately.")]
    Watchlist {
        #[command(subcommand)]
        cmd: WatchlistCommands,
    },
    /// Track how far you got
    #[command(long_about = "Start, update and inspect watch progress. Progress is a percentage between 0 and 100; values outside that range are clamped.")]
    Progress {
        #[command(subcommand)]
        cmd: ProgressCommands,
    },
    /// Browse and edit the remote film catalog
    #[command(long_about = "List, create, update and delete films in the remote catalog, or add a catalog film to your watchlist.")]
    Films {
        #[command(subcommand)]
        cmd: FilmCommands,
    },
    /// Show or create the configuration
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
    /// Clear stored watchlist and/or progress data
    #[command(long_about = "Delete the stored watchlist, the stored progress records, or both (--all). This cannot be undone.")]
    Clear {
        /// Clear the watchlist
        #[arg(long, action = ArgAction::SetTrue)]
        watchlist: bool,

        /// Clear watch progress
        #[arg(long, action = ArgAction::SetTrue)]
        progress: bool,

        /// Clear everything
        #[arg(long, action = ArgAction::SetTrue, conflicts_with_all = ["watchlist", "progress"])]
        all: bool,
    },
}

/// Display metadata shared by watchlist and catalog commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ItemFields {
    /// Title
    #[arg(long)]
    pub title: Option<String>,

    /// Description
    #[arg(long)]
    pub description: Option<String>,

    /// Rating (number or label, e.g. 8.2 or PG-13)
    #[arg(long)]
    pub rating: Option<String>,

    /// Category / genre
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Subcommand)]
pub enum WatchlistCommands {
    /// List watchlist entries in order
    List {
        /// Only entries with this status (plan-to-watch, watching, finished)
        #[arg(long)]
        status: Option<String>,
    },
    /// Add a title (ignored if its src is already listed)
    Add {
        /// Poster/reference URL identifying the title
        src: String,

        #[command(flatten)]
        fields: ItemFields,

        /// Type tag (film or series)
        #[arg(long = "type", value_name = "TYPE")]
        kind: Option<String>,

        /// Also start tracking progress from 0%
        #[arg(long, action = ArgAction::SetTrue)]
        start: bool,
    },
    /// Remove a title
    Remove {
        src: String,

        /// Also delete its progress record
        #[arg(long, action = ArgAction::SetTrue)]
        clear_progress: bool,
    },
    /// Set the note and status of a title
    Note {
        src: String,

        /// Free-text note (keeps the current note when omitted)
        #[arg(long)]
        note: Option<String>,

        /// plan-to-watch, watching or finished (keeps the current status when omitted)
        #[arg(long)]
        status: Option<String>,

        /// Progress percentage to record at the same time
        #[arg(long, allow_negative_numbers = true)]
        progress: Option<f64>,
    },
    /// Change display metadata of a title
    Edit {
        src: String,

        #[command(flatten)]
        fields: ItemFields,

        /// Type tag (film or series)
        #[arg(long = "type", value_name = "TYPE")]
        kind: Option<String>,
    },
    /// Check whether a title is on the watchlist
    Check { src: String },
    /// Add every item from a JSON array file, saving once at the end
    Import {
        file: PathBuf,

        /// Also start tracking progress for each imported item
        #[arg(long, action = ArgAction::SetTrue)]
        start: bool,
    },
}

#[derive(Subcommand)]
pub enum ProgressCommands {
    /// List progress records
    List {
        /// Only started, unfinished titles, most recent first
        #[arg(long, action = ArgAction::SetTrue)]
        in_progress: bool,
    },
    /// Start (or restart) tracking from 0%
    Start {
        id: String,

        /// Type tag (film or series)
        #[arg(long = "type", value_name = "TYPE", default_value = "film")]
        kind: String,
    },
    /// Record progress for a title that is already being tracked
    Set {
        id: String,

        /// Percentage, clamped into 0..=100
        #[arg(allow_negative_numbers = true)]
        percent: f64,
    },
    /// Show the progress record of a title
    Show { id: String },
    /// Stop tracking a title
    Remove { id: String },
}

#[derive(Subcommand)]
pub enum FilmCommands {
    /// List all films in the catalog
    List,
    /// Show one film
    Show { id: String },
    /// Create a film
    Add {
        #[command(flatten)]
        fields: ItemFields,

        /// Poster image URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Update fields of a film (other fields keep their current values)
    Update {
        id: String,

        #[command(flatten)]
        fields: ItemFields,

        /// Poster image URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Delete a film
    Delete { id: String },
    /// Add a catalog film to the watchlist
    Watch {
        id: String,

        /// Also start tracking progress from 0%
        #[arg(long, action = ArgAction::SetTrue)]
        start: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
    /// Print where configuration and data live
    Path,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let env = Env::load(cli.config.clone())?;

    logging::init_logging(cli.verbose, cli.quiet, &env.config.logging)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Watchlist { cmd } => watchlist::run_watchlist(cmd, &env, &output).await,
        Commands::Progress { cmd } => progress::run_progress(cmd, &env, &output).await,
        Commands::Films { cmd } => films::run_films(cmd, &env, &output).await,
        Commands::Config { cmd } => {
            let cmd = cmd.unwrap_or(ConfigCommands::Show);
            config::run_config(cmd, &env, &output).await
        }
        Commands::Clear { watchlist, progress, all } => clear::run_clear(watchlist, progress, all, &env, &output).await,
    }
}
