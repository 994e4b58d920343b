use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use binwatch::model::Coordinate;

#[derive(Parser)]
#[command(name = "binwatch")]
#[command(author, version, about)]
#[command(long_about = "Operations toolkit for smart waste bin sensors.\n\n\
    Inspect bin metrics, plan collection routes and review fill-level history.\n\n\
    Examples:\n  \
    binwatch bins --min-fill 75          Bins due for collection\n  \
    binwatch route --min-fill 75         Plan a route through them\n  \
    binwatch heatmap --from 2024-03-01   Fill-level bands per day\n  \
    binwatch project show                Per-project configuration")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List bins with their latest sensor metrics
    Bins {
        /// Project to query (defaults to backend.project)
        #[arg(short, long)]
        project: Option<String>,

        /// Only show bins at or above this fill level
        #[arg(long)]
        min_fill: Option<f64>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Plan a collection route through selected bins
    Route {
        /// Project to query (defaults to backend.project)
        #[arg(short, long)]
        project: Option<String>,

        /// JSON file with the selected stops, in selection order
        #[arg(long, conflicts_with = "min_fill")]
        stops: Option<PathBuf>,

        /// Select every bin at or above this fill level (defaults to thresholds.collect_at)
        #[arg(long)]
        min_fill: Option<f64>,

        /// Start and end point as lat,lon (defaults to routing.depot)
        #[arg(long)]
        depot: Option<Coordinate>,

        /// Print JSON instead of a list
        #[arg(long)]
        json: bool,
    },

    /// Count bins per fill-level band for each day
    Heatmap {
        /// Project to query (defaults to backend.project)
        #[arg(short, long, conflicts_with = "input")]
        project: Option<String>,

        /// JSON file with readings instead of fetching them
        #[arg(long)]
        input: Option<PathBuf>,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Print JSON cells instead of a table
        #[arg(long)]
        json: bool,
    },

    /// View and modify per-project configuration on the backend
    Project {
        /// Project to edit (defaults to backend.project)
        #[arg(short, long, global = true)]
        project: Option<String>,

        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// View and modify local configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Display the project configuration
    Show,

    /// Set a project configuration value
    Set {
        /// Configuration key, dots for nesting (e.g. thresholds.fill)
        key: String,

        /// Value; parsed as JSON when possible, otherwise sent as a string
        value: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. backend.base_url, routing.depot, thresholds.collect_at)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Bins {
                project,
                min_fill,
                json,
            }) => crate::commands::bins::run(project, min_fill, json),
            Some(Commands::Route {
                project,
                stops,
                min_fill,
                depot,
                json,
            }) => {
                if let Some(file) = &stops {
                    if !file.exists() {
                        anyhow::bail!("File not found: {}", file.display());
                    }
                }
                crate::commands::route::run(project, stops, min_fill, depot, json)
            }
            Some(Commands::Heatmap {
                project,
                input,
                from,
                to,
                json,
            }) => {
                if let Some(file) = &input {
                    if !file.exists() {
                        anyhow::bail!("File not found: {}", file.display());
                    }
                }
                crate::commands::heatmap::run(project, input, from, to, json)
            }
            Some(Commands::Project { project, command }) => {
                crate::commands::project::run(project, command)
            }
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                println!("binwatch {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                use clap::CommandFactory;
                let mut cmd = Self::command();
                cmd.print_help()?;
                println!();
                Ok(())
            }
        }
    }
}
