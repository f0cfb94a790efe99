use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use dmr_model::{Dataset, IdRange, Rating};
use dmr_output::{RatingSummary, export_ratings, export_to_file};
use dmr_persistence::load_progress;
use dmr_session::{Advance, Navigation, Phase, RatingSession};

use dmr_cli::display::{item_heading, pair_table, status_table, summary_table};
use dmr_cli::review::{ReviewOptions, Reviewer, check_within_bounds};
use dmr_cli::settings::Settings;
use dmr_cli::workspace::Workspace;

use crate::cli::{ExportArgs, StartArgs};

/// One-shot transitions on a stored session.
#[derive(Clone, Copy)]
pub enum Transition {
    Rate(Rating),
    Skip,
    Next,
    Previous,
}

pub fn run_bounds(workspace: &Workspace) -> Result<()> {
    let dataset = workspace.load_dataset()?;
    let Some((min, max)) = dataset.id_bounds() else {
        bail!("{} has no rows", workspace.data_path().display());
    };
    let labeled = dataset
        .records()
        .iter()
        .filter(|record| record.human.is_some())
        .count();
    println!("Dataset: {}", workspace.data_path().display());
    println!("Rows: {}", dataset.len());
    println!("IDs: {min}-{max}");
    if labeled > 0 {
        println!("Already labeled: {labeled}");
    }
    Ok(())
}

pub fn run_start(workspace: &Workspace, settings: &Settings, args: &StartArgs) -> Result<()> {
    let dataset = workspace.load_dataset()?;
    let Some((min, _)) = dataset.id_bounds() else {
        bail!("{} has no rows", workspace.data_path().display());
    };
    let start = args.from.unwrap_or(min);
    let range = IdRange::new(start, args.to.unwrap_or(start));
    check_within_bounds(&dataset, range)?;

    let path = args
        .progress
        .clone()
        .unwrap_or_else(|| workspace.progress_path(range));
    if path.exists() && !args.force {
        bail!(
            "{} already exists; continue it with `match-rater review` or pass --force to start over",
            path.display()
        );
    }

    let mut session = RatingSession::new();
    session.start_range(&dataset, range)?;
    workspace.save_session(&session, &dataset, &path)?;

    println!("Rating {} items in ID range: {range}", session.len());
    println!("Progress: {}", path.display());
    print_current(&dataset, &session, settings.display.show_ids);
    Ok(())
}

pub fn run_review(workspace: &Workspace, settings: &Settings, progress: Option<&Path>) -> Result<()> {
    let dataset = workspace.load_dataset()?;
    let options = ReviewOptions {
        autosave: settings.autosave.clone(),
        show_ids: settings.display.show_ids,
    };
    let stdin = io::stdin();
    let stdout = io::stdout();
    let reviewer = Reviewer::new(&dataset, workspace, options, stdin.lock(), stdout.lock());

    let reviewer = match workspace.find_progress(progress)? {
        Some(path) => {
            let session = open(workspace, &dataset, &path)?;
            reviewer.with_session(session, path)
        }
        None => reviewer,
    };
    reviewer.run()?;
    Ok(())
}

pub fn run_transition(
    workspace: &Workspace,
    settings: &Settings,
    progress: Option<&Path>,
    transition: Transition,
) -> Result<()> {
    let dataset = workspace.load_dataset()?;
    let path = workspace.require_progress(progress)?;
    let mut session = open(workspace, &dataset, &path)?;

    match transition {
        Transition::Rate(rating) => {
            let advance = session.rate(rating)?;
            report_advance(advance);
        }
        Transition::Skip => {
            let advance = session.skip()?;
            report_advance(advance);
        }
        Transition::Next => report_navigation(session.next()?, "last"),
        Transition::Previous => report_navigation(session.previous()?, "first"),
    }

    workspace.save_session(&session, &dataset, &path)?;
    print_current(&dataset, &session, settings.display.show_ids);
    Ok(())
}

pub fn run_status(workspace: &Workspace, progress: Option<&Path>) -> Result<()> {
    let dataset = workspace.load_dataset()?;
    let path = workspace.require_progress(progress)?;
    let session = open(workspace, &dataset, &path)?;
    let Some(range) = session.range() else {
        bail!("{} holds no session", path.display());
    };
    println!("Progress: {}", path.display());
    println!("{}", status_table(range, session.phase(), &session.progress()));
    Ok(())
}

pub fn run_export(workspace: &Workspace, args: &ExportArgs) -> Result<()> {
    let dataset = workspace.load_dataset()?;
    let path = workspace.require_progress(args.progress.progress.as_deref())?;
    let session = open(workspace, &dataset, &path)?;
    let (Some(range), Some(ratings)) = (session.range(), session.ratings()) else {
        bail!("{} holds no session", path.display());
    };

    let table = export_ratings(&dataset, ratings, range);
    let output: PathBuf = args
        .output
        .clone()
        .unwrap_or_else(|| workspace.export_path(range));
    export_to_file(&table, &output)
        .with_context(|| format!("export ratings to {}", output.display()))?;

    println!("{}", summary_table(range, &RatingSummary::from_table(&table)));
    println!("Exported {} rows to {}", table.len(), output.display());
    let unrated = session.progress().unrated();
    if unrated > 0 {
        println!("note: {unrated} items in this range are not rated yet");
    }
    Ok(())
}

pub fn run_reset(workspace: &Workspace, progress: Option<&Path>) -> Result<()> {
    let path = workspace.require_progress(progress)?;
    // Only delete files that really are progress documents.
    let document = load_progress(&path)?;
    fs::remove_file(&path).with_context(|| format!("remove {}", path.display()))?;
    tracing::info!(path = %path.display(), range = %document.range(), "Reset rating session");
    println!("Removed {}", path.display());
    Ok(())
}

fn open(workspace: &Workspace, dataset: &Dataset, path: &Path) -> Result<RatingSession> {
    let restored = workspace.open_session(path, dataset)?;
    for warning in &restored.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(restored.session)
}

fn report_advance(advance: Advance) {
    if advance == Advance::Completed {
        println!("All items in your range have been rated!");
    }
}

fn report_navigation(navigation: Navigation, edge: &str) {
    if navigation == Navigation::AtBoundary {
        println!("Already at the {edge} item.");
    }
}

fn print_current(dataset: &Dataset, session: &RatingSession, show_ids: bool) {
    if session.phase() != Phase::InProgress {
        return;
    }
    let Some(position) = session.current_position() else {
        return;
    };
    let Some(record) = dataset.get(position) else {
        return;
    };
    println!("{}", item_heading(&session.progress()));
    println!("{}", pair_table(record, session.rating_at(position), show_ids));
}
