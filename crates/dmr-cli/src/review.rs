//! Interactive review loop.
//!
//! Reads one command per line, applies it to the session and redraws the
//! current pair. Progress is written through the autosave policy and always
//! on exit, so quitting never loses ratings.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use dmr_model::{Dataset, IdRange, Rating};
use dmr_output::{RatingSummary, export_ratings, export_to_file};
use dmr_persistence::{AutoSaveConfig, DirtyTracker};
use dmr_session::{Advance, Navigation, Phase, RatingSession};

use crate::display::{item_heading, pair_table, status_table, summary_table};
use crate::workspace::Workspace;

const KEYS_HELP: &str =
    "[m] match  [n] no match  [s] skip  [j] next  [k] previous  [w] save  [e PATH] export  [t] status  [r] reset  [q] quit";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    Rate(Rating),
    Skip,
    Next,
    Previous,
    Save,
    Export(Option<PathBuf>),
    Status,
    Reset,
    Help,
    Quit,
    /// Two ids: choose a range while no session is active.
    Range(IdRange),
}

/// Parse a line of input. Blank lines yield `None`.
pub fn parse_action(line: &str) -> Result<Option<ReviewAction>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let action = match command.to_ascii_lowercase().as_str() {
        "m" | "match" => ReviewAction::Rate(Rating::Match),
        "n" | "no-match" | "nomatch" => ReviewAction::Rate(Rating::NoMatch),
        "s" | "skip" => ReviewAction::Skip,
        "j" | "next" => ReviewAction::Next,
        "k" | "prev" | "previous" => ReviewAction::Previous,
        "w" | "save" => ReviewAction::Save,
        "e" | "export" => {
            ReviewAction::Export((!rest.is_empty()).then(|| PathBuf::from(rest)))
        }
        "t" | "status" => ReviewAction::Status,
        "r" | "reset" => ReviewAction::Reset,
        "h" | "?" | "help" => ReviewAction::Help,
        "q" | "quit" | "exit" => ReviewAction::Quit,
        _ => ReviewAction::Range(parse_range(line)?),
    };
    Ok(Some(action))
}

/// Parse `START END` (space or comma separated).
pub fn parse_range(text: &str) -> Result<IdRange> {
    let parts: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .collect();
    let [start, end] = parts.as_slice() else {
        bail!("unknown command '{text}'; type h for help");
    };
    let start: i64 = start
        .parse()
        .with_context(|| format!("'{start}' is not an id"))?;
    let end: i64 = end.parse().with_context(|| format!("'{end}' is not an id"))?;
    Ok(IdRange::new(start, end))
}

/// Reject ranges that reach outside the dataset's ids.
pub fn check_within_bounds(dataset: &Dataset, range: IdRange) -> Result<()> {
    let Some((min, max)) = dataset.id_bounds() else {
        bail!("the dataset has no rows");
    };
    if range.start < min || range.end > max {
        bail!("IDs must lie between {min} and {max}");
    }
    Ok(())
}

/// Settings for one review run.
#[derive(Debug, Clone)]
pub struct ReviewOptions {
    pub autosave: AutoSaveConfig,
    pub show_ids: bool,
}

impl Default for ReviewOptions {
    fn default() -> Self {
        Self {
            autosave: AutoSaveConfig::default(),
            show_ids: true,
        }
    }
}

/// Drives a [`RatingSession`] from line-based input.
pub struct Reviewer<'a, R, W> {
    dataset: &'a Dataset,
    workspace: &'a Workspace,
    options: ReviewOptions,
    session: RatingSession,
    progress_path: Option<PathBuf>,
    tracker: DirtyTracker,
    input: R,
    output: W,
}

enum Control {
    Continue,
    Quit,
}

impl<'a, R: BufRead, W: Write> Reviewer<'a, R, W> {
    pub fn new(
        dataset: &'a Dataset,
        workspace: &'a Workspace,
        options: ReviewOptions,
        input: R,
        output: W,
    ) -> Self {
        Self {
            dataset,
            workspace,
            options,
            session: RatingSession::new(),
            progress_path: None,
            tracker: DirtyTracker::new(),
            input,
            output,
        }
    }

    /// Continue an existing session stored at `path`.
    #[must_use]
    pub fn with_session(mut self, session: RatingSession, path: PathBuf) -> Self {
        self.session = session;
        self.progress_path = Some(path);
        self
    }

    /// Run until `q` or end of input; returns the final session.
    ///
    /// Pending progress is saved on every exit, including input and output
    /// failures. The loop's error wins over a failed final save.
    pub fn run(mut self) -> Result<RatingSession> {
        let outcome = self.interact();
        let flushed = self.flush();
        outcome?;
        flushed?;
        Ok(self.session)
    }

    fn interact(&mut self) -> Result<()> {
        self.render()?;
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(());
            }

            let action = match parse_action(&line) {
                Ok(Some(action)) => action,
                Ok(None) => {
                    self.render()?;
                    continue;
                }
                Err(error) => {
                    writeln!(self.output, "{error:#}")?;
                    continue;
                }
            };

            match self.handle(action) {
                Ok(Control::Continue) => {}
                Ok(Control::Quit) => return Ok(()),
                Err(error) => writeln!(self.output, "error: {error:#}")?,
            }
        }
    }

    fn handle(&mut self, action: ReviewAction) -> Result<Control> {
        match action {
            ReviewAction::Rate(rating) => {
                let advance = self.session.rate(rating)?;
                self.changed(advance)?;
            }
            ReviewAction::Skip => {
                let advance = self.session.skip()?;
                self.changed(advance)?;
            }
            ReviewAction::Next => {
                let navigation = self.session.next()?;
                self.moved(navigation, "last")?;
            }
            ReviewAction::Previous => {
                let navigation = self.session.previous()?;
                self.moved(navigation, "first")?;
            }
            ReviewAction::Save => {
                self.save()?;
                if let Some(path) = &self.progress_path {
                    writeln!(self.output, "Saved progress to {}", path.display())?;
                }
            }
            ReviewAction::Export(path) => {
                self.export(path)?;
            }
            ReviewAction::Status => match self.session.range() {
                Some(range) => {
                    let table = status_table(range, self.session.phase(), &self.session.progress());
                    writeln!(self.output, "{table}")?;
                }
                None => self.render()?,
            },
            ReviewAction::Reset => {
                self.flush()?;
                if let Some(path) = self.progress_path.take() {
                    writeln!(
                        self.output,
                        "Progress kept in {}; entering the same range resumes it. \
                         Run `match-rater reset --progress {}` to start that range over.",
                        path.display(),
                        path.display()
                    )?;
                }
                self.session.reset();
                self.tracker = DirtyTracker::new();
                self.render()?;
            }
            ReviewAction::Help => {
                writeln!(self.output, "{KEYS_HELP}")?;
                writeln!(self.output, "While no range is selected, enter START END.")?;
            }
            ReviewAction::Quit => return Ok(Control::Quit),
            ReviewAction::Range(range) => {
                self.start(range)?;
                self.render()?;
            }
        }
        Ok(Control::Continue)
    }

    fn start(&mut self, range: IdRange) -> Result<()> {
        if self.session.phase() != Phase::AwaitingRange {
            bail!("a range is already being rated; press r to choose another");
        }
        check_within_bounds(self.dataset, range)?;

        let path = self.workspace.progress_path(range);
        if path.exists() {
            let restored = self.workspace.open_session(&path, self.dataset)?;
            for warning in &restored.warnings {
                writeln!(self.output, "warning: {warning}")?;
            }
            writeln!(self.output, "Resuming saved progress from {}", path.display())?;
            self.session = restored.session;
            self.progress_path = Some(path);
            return Ok(());
        }

        self.session.start_range(self.dataset, range)?;
        self.progress_path = Some(path);
        self.mark_dirty()
    }

    fn changed(&mut self, advance: Advance) -> Result<()> {
        self.mark_dirty()?;
        if advance == Advance::Completed {
            writeln!(self.output, "All items in your range have been rated!")?;
        }
        self.render()
    }

    fn moved(&mut self, navigation: Navigation, edge: &str) -> Result<()> {
        match navigation {
            Navigation::Moved { .. } => {
                self.mark_dirty()?;
                self.render()
            }
            Navigation::AtBoundary => {
                writeln!(self.output, "Already at the {edge} item.")?;
                Ok(())
            }
        }
    }

    fn mark_dirty(&mut self) -> Result<()> {
        self.tracker.mark_dirty();
        if self.tracker.should_auto_save(&self.options.autosave) {
            self.save()?;
        }
        Ok(())
    }

    /// Save if anything changed since the last save.
    fn flush(&mut self) -> Result<()> {
        if self.tracker.is_dirty() && self.session.phase() != Phase::AwaitingRange {
            self.save()?;
        }
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        let Some(path) = self.progress_path.clone() else {
            bail!("no range selected; nothing to save");
        };
        self.tracker.start_save();
        match self.workspace.save_session(&self.session, self.dataset, &path) {
            Ok(()) => {
                self.tracker.save_complete();
                tracing::debug!(path = %path.display(), "Saved review progress");
                Ok(())
            }
            Err(error) => {
                self.tracker.save_failed();
                Err(error)
            }
        }
    }

    fn export(&mut self, path: Option<PathBuf>) -> Result<()> {
        let (Some(range), Some(ratings)) = (self.session.range(), self.session.ratings()) else {
            bail!("no range selected; nothing to export");
        };
        let table = export_ratings(self.dataset, ratings, range);
        let path = path.unwrap_or_else(|| self.workspace.export_path(range));
        export_to_file(&table, &path)
            .with_context(|| format!("export ratings to {}", path.display()))?;

        writeln!(self.output, "{}", summary_table(range, &RatingSummary::from_table(&table)))?;
        writeln!(self.output, "Exported {} rows to {}", table.len(), path.display())?;
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        match self.session.phase() {
            Phase::AwaitingRange => {
                if let Some((min, max)) = self.dataset.id_bounds() {
                    writeln!(
                        self.output,
                        "Enter an ID range between {min} and {max} as START END (q to quit)."
                    )?;
                }
            }
            Phase::InProgress => {
                let progress = self.session.progress();
                let Some(position) = self.session.current_position() else {
                    return Ok(());
                };
                let Some(record) = self.dataset.get(position) else {
                    bail!("row {position} is missing from the dataset");
                };
                if let Some(range) = self.session.range() {
                    writeln!(self.output, "Rating items in ID range: {range}")?;
                }
                writeln!(self.output, "{}", item_heading(&progress))?;
                let table = pair_table(record, self.session.rating_at(position), self.options.show_ids);
                writeln!(self.output, "{table}")?;
                writeln!(self.output, "{KEYS_HELP}")?;
            }
            Phase::Completed => {
                if let (Some(range), Some(ratings)) = (self.session.range(), self.session.ratings()) {
                    let table = export_ratings(self.dataset, ratings, range);
                    let summary = RatingSummary::from_table(&table);
                    writeln!(self.output, "{}", summary_table(range, &summary))?;
                }
                writeln!(
                    self.output,
                    "[e PATH] export  [w] save  [r] rate another range  [q] quit"
                )?;
            }
        }
        Ok(())
    }
}
