//! CLI argument definitions for the match rater.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use dmr_model::Rating;

#[derive(Parser)]
#[command(
    name = "match-rater",
    version,
    about = "Rate candidate OPD/FDA device matches",
    long_about = "Rate candidate OPD/FDA device matches one pair at a time.\n\n\
                  Pick an ID range, label each pair as match or no match, and\n\
                  export the labeled rows as CSV. Progress is kept in a JSON file\n\
                  so a session can be resumed later."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Dataset CSV (default: the configured dataset path).
    #[arg(long = "data", value_name = "PATH", global = true)]
    pub data: Option<PathBuf>,

    /// Settings file to use instead of the platform default.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the dataset size and its smallest and largest ID.
    Bounds,

    /// Select an ID range and start a new rating session.
    Start(StartArgs),

    /// Rate pairs interactively.
    Review(ProgressArgs),

    /// Rate the current pair and move on.
    Rate(RateArgs),

    /// Move on without rating the current pair.
    Skip(ProgressArgs),

    /// Move to the next pair.
    Next(ProgressArgs),

    /// Move back to the previous pair.
    Previous(ProgressArgs),

    /// Show progress for the current session.
    Status(ProgressArgs),

    /// Write the rated rows of the session's range as CSV.
    Export(ExportArgs),

    /// Discard the session's progress file.
    Reset(ProgressArgs),
}

#[derive(Args)]
pub struct ProgressArgs {
    /// Progress file (default: the only one in the progress directory).
    #[arg(long = "progress", value_name = "PATH")]
    pub progress: Option<PathBuf>,
}

#[derive(Args)]
pub struct StartArgs {
    /// First ID of the range (default: smallest ID in the dataset).
    #[arg(long = "from", value_name = "ID", allow_negative_numbers = true)]
    pub from: Option<i64>,

    /// Last ID of the range (default: same as --from).
    #[arg(long = "to", value_name = "ID", allow_negative_numbers = true)]
    pub to: Option<i64>,

    /// Where to write the progress file
    /// (default: rating_progress_IDs_<FROM>-<TO>.json in the progress directory).
    #[arg(long = "progress", value_name = "PATH")]
    pub progress: Option<PathBuf>,

    /// Overwrite an existing progress file.
    #[arg(long = "force")]
    pub force: bool,
}

#[derive(Args)]
pub struct RateArgs {
    #[arg(value_enum)]
    pub rating: RatingArg,

    #[command(flatten)]
    pub progress: ProgressArgs,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output CSV (default: device_match_ratings_IDs_<FROM>-<TO>.csv).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub progress: ProgressArgs,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RatingArg {
    Match,
    NoMatch,
}

impl From<RatingArg> for Rating {
    fn from(arg: RatingArg) -> Self {
        match arg {
            RatingArg::Match => Rating::Match,
            RatingArg::NoMatch => Rating::NoMatch,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
