//! Terminal tables for pairs, progress and results.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use dmr_model::{IdRange, MatchRecord, Rating};
use dmr_output::RatingSummary;
use dmr_session::{Phase, SessionProgress};

/// "Current Item: k/n" line shown above each pair.
pub fn item_heading(progress: &SessionProgress) -> String {
    format!("Current Item: {}/{}", progress.cursor + 1, progress.total)
}

/// Side-by-side view of one candidate pair.
pub fn pair_table(record: &MatchRecord, rating: Option<Rating>, show_ids: bool) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell(""),
        header_cell("OPD Device"),
        header_cell("FDA Device"),
    ]);
    apply_pair_table_style(&mut table);

    table.add_row(vec![
        label_cell("Device"),
        Cell::new(&record.opd_device).add_attribute(Attribute::Bold),
        Cell::new(&record.fda_device).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        label_cell("Company"),
        Cell::new(&record.opd_company),
        Cell::new(&record.fda_company),
    ]);
    if show_ids {
        table.add_row(vec![label_cell("ID"), Cell::new(record.id), dim_cell("")]);
    }
    table.add_row(vec![label_cell("Rating"), rating_cell(rating), dim_cell("")]);
    table
}

pub fn status_table(range: IdRange, phase: Phase, progress: &SessionProgress) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Session"), header_cell("")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);

    table.add_row(vec![label_cell("ID range"), Cell::new(range)]);
    table.add_row(vec![label_cell("Phase"), phase_cell(phase)]);
    table.add_row(vec![
        label_cell("Current item"),
        Cell::new(format!("{}/{}", progress.cursor + 1, progress.total)),
    ]);
    table.add_row(vec![label_cell("Rated"), Cell::new(progress.rated)]);
    table.add_row(vec![
        label_cell("Match"),
        count_cell(progress.matches, Color::Green),
    ]);
    table.add_row(vec![
        label_cell("No Match"),
        count_cell(progress.no_matches, Color::Red),
    ]);
    table.add_row(vec![
        label_cell("Unrated"),
        count_cell(progress.unrated(), Color::Yellow),
    ]);
    table
}

/// Label counts over an exported range.
pub fn summary_table(range: IdRange, summary: &RatingSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID range"),
        header_cell("Rows"),
        header_cell("Match"),
        header_cell("No Match"),
        header_cell("Unrated"),
        header_cell("Match rate"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let match_rate = match summary.match_rate() {
        Some(rate) => Cell::new(format!("{:.1}%", rate * 100.0)),
        None => dim_cell("-"),
    };
    table.add_row(vec![
        Cell::new(range).add_attribute(Attribute::Bold),
        Cell::new(summary.total),
        count_cell(summary.matches, Color::Green),
        count_cell(summary.no_matches, Color::Red),
        count_cell(summary.unrated(), Color::Yellow),
        match_rate,
    ]);
    table
}

fn apply_pair_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn rating_cell(rating: Option<Rating>) -> Cell {
    match rating {
        Some(Rating::Match) => Cell::new(Rating::Match)
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        Some(Rating::NoMatch) => Cell::new(Rating::NoMatch)
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        None => dim_cell("unrated"),
    }
}

fn phase_cell(phase: Phase) -> Cell {
    match phase {
        Phase::Completed => Cell::new(phase).fg(Color::Green),
        Phase::InProgress => Cell::new(phase).fg(Color::Yellow),
        Phase::AwaitingRange => dim_cell(phase),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn label_cell(label: &str) -> Cell {
    Cell::new(label).fg(Color::Blue)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_heading_is_one_based() {
        let progress = SessionProgress {
            total: 3,
            rated: 1,
            matches: 1,
            no_matches: 0,
            cursor: 1,
        };
        assert_eq!(item_heading(&progress), "Current Item: 2/3");
    }

    #[test]
    fn pair_table_shows_both_devices() {
        let record = MatchRecord::new(42, "Infusion pump", "Acme", "Pump, infusion", "Acme Inc");
        let rendered = pair_table(&record, Some(Rating::NoMatch), true).to_string();
        assert!(rendered.contains("Infusion pump"));
        assert!(rendered.contains("Pump, infusion"));
        assert!(rendered.contains("42"));
        assert!(rendered.contains("No Match"));

        let hidden = pair_table(&record, None, false).to_string();
        assert!(!hidden.contains("42"));
        assert!(hidden.contains("unrated"));
    }

    #[test]
    fn summary_without_labels_has_no_rate() {
        let summary = RatingSummary {
            total: 2,
            matches: 0,
            no_matches: 0,
        };
        let rendered = summary_table(IdRange::new(1, 2), &summary).to_string();
        assert!(rendered.contains("1-2"));
        assert!(!rendered.contains('%'));
    }
}
