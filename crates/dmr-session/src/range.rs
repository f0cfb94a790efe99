//! Id range selection.

use dmr_model::{Dataset, IdRange, Position};

use crate::error::{Result, SessionError};

/// Positions of every row whose id lies in `range`, in dataset order.
///
/// Pure: the dataset is only read. Fails with
/// [`SessionError::InvalidRange`] when `range.start > range.end` and with
/// [`SessionError::EmptySelection`] when no row matches.
pub fn select_range(dataset: &Dataset, range: IdRange) -> Result<Vec<Position>> {
    if !range.is_ordered() {
        return Err(SessionError::InvalidRange {
            start: range.start,
            end: range.end,
        });
    }

    let positions: Vec<Position> = dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| range.contains(record.id))
        .map(|(position, _)| position)
        .collect();

    if positions.is_empty() {
        return Err(SessionError::EmptySelection {
            start: range.start,
            end: range.end,
        });
    }

    tracing::debug!(range = %range, selected = positions.len(), "Selected id range");
    Ok(positions)
}
