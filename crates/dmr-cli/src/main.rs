//! Device match rater CLI.

use clap::{ColorChoice, Parser};
use dmr_cli::logging::{LogConfig, LogFormat, init_logging};
use dmr_cli::settings::load_settings;
use dmr_cli::workspace::Workspace;
use dmr_persistence::PersistenceError;
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{
    Transition, run_bounds, run_export, run_reset, run_review, run_start, run_status,
    run_transition,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(cli) {
        Ok(()) => 0,
        Err(error) => {
            report_error(&error);
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings(cli.config.as_deref());
    let workspace = Workspace::from_settings(&settings, cli.data);

    match cli.command {
        Command::Bounds => run_bounds(&workspace),
        Command::Start(args) => run_start(&workspace, &settings, &args),
        Command::Review(args) => run_review(&workspace, &settings, args.progress.as_deref()),
        Command::Rate(args) => run_transition(
            &workspace,
            &settings,
            args.progress.progress.as_deref(),
            Transition::Rate(args.rating.into()),
        ),
        Command::Skip(args) => run_transition(
            &workspace,
            &settings,
            args.progress.as_deref(),
            Transition::Skip,
        ),
        Command::Next(args) => run_transition(
            &workspace,
            &settings,
            args.progress.as_deref(),
            Transition::Next,
        ),
        Command::Previous(args) => run_transition(
            &workspace,
            &settings,
            args.progress.as_deref(),
            Transition::Previous,
        ),
        Command::Status(args) => run_status(&workspace, args.progress.as_deref()),
        Command::Export(args) => run_export(&workspace, &args),
        Command::Reset(args) => run_reset(&workspace, args.progress.as_deref()),
    }
}

/// Print the error chain, plus a hint when a persistence error has one.
fn report_error(error: &anyhow::Error) {
    let persistence = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<PersistenceError>());
    match persistence {
        Some(cause) => {
            eprintln!("error: {}", cause.user_message());
            if let Some(suggestion) = cause.suggestion() {
                eprintln!("hint: {suggestion}");
            }
            tracing::debug!("{error:#}");
        }
        None => eprintln!("error: {error:#}"),
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
