//! Label counts over an export.

use dmr_model::Rating;

use crate::export::ExportTable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingSummary {
    pub total: usize,
    pub matches: usize,
    pub no_matches: usize,
}

impl RatingSummary {
    pub fn from_table(table: &ExportTable) -> Self {
        table
            .rows
            .iter()
            .fold(Self::default(), |mut summary, row| {
                summary.total += 1;
                match row.label {
                    Some(Rating::Match) => summary.matches += 1,
                    Some(Rating::NoMatch) => summary.no_matches += 1,
                    None => {}
                }
                summary
            })
    }

    pub fn unrated(&self) -> usize {
        self.total - self.matches - self.no_matches
    }

    /// Share of rows labeled as matches, or `None` if nothing is labeled.
    pub fn match_rate(&self) -> Option<f64> {
        let labeled = self.matches + self.no_matches;
        if labeled == 0 {
            return None;
        }
        Some(self.matches as f64 / labeled as f64)
    }
}
