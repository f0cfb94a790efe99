//! Integration tests for progress documents: snapshot, files, restore.

use dmr_model::{Dataset, DatasetIdentity, IdRange, MatchRecord, Rating};
use dmr_persistence::{
    PersistenceError, RestoreWarning, default_progress_file_name, load_progress, parse_progress,
    restore, save_progress, snapshot, to_json,
};
use dmr_session::{Phase, RatingSession};
use proptest::prelude::*;
use tempfile::tempdir;

fn dataset(ids: &[i64]) -> Dataset {
    Dataset::from_records(
        DatasetIdentity::new("device_match_humanrating.csv").with_sha256("ab12"),
        ids.iter()
            .map(|&id| {
                MatchRecord::new(
                    id,
                    format!("OPD device {id}"),
                    "OPD Co",
                    format!("FDA device {id}"),
                    "FDA Co",
                )
            })
            .collect(),
    )
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Match,
    NoMatch,
    Skip,
    Next,
    Previous,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Match),
        Just(Action::NoMatch),
        Just(Action::Skip),
        Just(Action::Next),
        Just(Action::Previous),
    ]
}

fn apply(session: &mut RatingSession, action: Action) {
    // Rejections (e.g. rating a completed session) leave state unchanged.
    let _ = match action {
        Action::Match => session.rate(Rating::Match).map(|_| ()),
        Action::NoMatch => session.rate(Rating::NoMatch).map(|_| ()),
        Action::Skip => session.skip().map(|_| ()),
        Action::Next => session.next().map(|_| ()),
        Action::Previous => session.previous().map(|_| ()),
    };
}

#[test]
fn save_load_restore_resumes_session() {
    let data = dataset(&[1, 2, 3, 4, 5]);
    let mut session = RatingSession::new();
    session.start_range(&data, IdRange::new(2, 4)).unwrap();
    session.rate(Rating::Match).unwrap();

    let dir = tempdir().unwrap();
    let path = dir
        .path()
        .join(default_progress_file_name(IdRange::new(2, 4)));
    assert!(path.ends_with("rating_progress_IDs_2-4.json"));

    let progress = snapshot(&session, data.identity()).unwrap();
    save_progress(&progress, &path).unwrap();

    let loaded = load_progress(&path).unwrap();
    assert_eq!(loaded, progress);

    let restored = restore(loaded, &data).unwrap();
    assert!(restored.warnings.is_empty());
    assert_eq!(restored.session, session);
    assert_eq!(restored.session.cursor(), Some(1));
}

#[test]
fn snapshot_requires_active_session() {
    let data = dataset(&[1]);
    assert!(matches!(
        snapshot(&RatingSession::new(), data.identity()),
        Err(PersistenceError::NoActiveSession)
    ));
}

#[test]
fn legacy_document_restores_with_clamped_cursor() {
    let data = dataset(&[1, 2, 3, 4, 5]);
    let text = r#"{
        "id_start": 2,
        "id_end": 4,
        "data_file_name": "device_match_humanrating.csv",
        "filtered_indices": [1, 2, 3],
        "current_index_in_filtered": 7,
        "ratings": {"1": 1, "2": null, "3": null},
        "timestamp": "2024-05-01 14:03:22"
    }"#;

    let restored = restore(parse_progress(text).unwrap(), &data).unwrap();
    assert_eq!(restored.session.phase(), Phase::InProgress);
    assert_eq!(restored.session.cursor(), Some(2));
    assert_eq!(restored.session.rating_at(1), Some(Rating::Match));
    assert_eq!(restored.session.rating_at(2), None);
    assert_eq!(
        restored.warnings,
        vec![RestoreWarning::CursorClamped {
            requested: 7,
            clamped: 2
        }]
    );
}

#[test]
fn fully_rated_document_restores_completed() {
    let data = dataset(&[1, 2]);
    let text = r#"{
        "id_start": 1,
        "id_end": 2,
        "filtered_indices": [0, 1],
        "current_index_in_filtered": 1,
        "ratings": {"0": 0, "1": 1}
    }"#;

    let restored = restore(parse_progress(text).unwrap(), &data).unwrap();
    assert_eq!(restored.session.phase(), Phase::Completed);
}

#[test]
fn different_data_file_warns_but_restores() {
    let data = dataset(&[1, 2]);
    let text = r#"{
        "id_start": 1,
        "id_end": 2,
        "data_file_name": "other.csv",
        "filtered_indices": [0, 1],
        "current_index_in_filtered": 0,
        "ratings": {}
    }"#;

    let restored = restore(parse_progress(text).unwrap(), &data).unwrap();
    assert!(matches!(
        restored.warnings.as_slice(),
        [RestoreWarning::DatasetMismatch { .. }]
    ));
    assert_eq!(restored.session.len(), 2);
}

#[test]
fn positions_beyond_dataset_are_rejected() {
    let data = dataset(&[1, 2]);
    let text = r#"{
        "id_start": 1,
        "id_end": 2,
        "filtered_indices": [0, 5],
        "current_index_in_filtered": 0,
        "ratings": {}
    }"#;

    assert!(matches!(
        restore(parse_progress(text).unwrap(), &data),
        Err(PersistenceError::PositionOutOfBounds {
            position: 5,
            rows: 2
        })
    ));
}

#[test]
fn repeated_positions_are_rejected() {
    let data = dataset(&[1, 2, 3]);
    let text = r#"{
        "id_start": 1,
        "id_end": 3,
        "filtered_indices": [2, 0, 0],
        "current_index_in_filtered": 0,
        "ratings": {}
    }"#;

    let err = restore(parse_progress(text).unwrap(), &data).unwrap_err();
    assert!(matches!(err, PersistenceError::MalformedProgress { .. }));
    assert!(err.to_string().contains("strictly increasing"));
}

#[test]
fn rows_outside_recorded_range_warn() {
    let data = dataset(&[1, 2, 3, 4, 5]);
    let text = r#"{
        "id_start": 2,
        "id_end": 3,
        "filtered_indices": [1, 2, 3],
        "current_index_in_filtered": 0,
        "ratings": {"1": 1}
    }"#;

    let restored = restore(parse_progress(text).unwrap(), &data).unwrap();
    assert_eq!(
        restored.warnings,
        vec![RestoreWarning::PositionsOutsideRange { count: 1 }]
    );
    assert_eq!(restored.session.len(), 3);
    assert_eq!(restored.session.rating_at(1), Some(Rating::Match));
}

#[test]
fn ratings_outside_selection_are_dropped_with_warning() {
    let data = dataset(&[1, 2, 3, 4, 5]);
    let text = r#"{
        "id_start": 1,
        "id_end": 2,
        "filtered_indices": [0, 1],
        "current_index_in_filtered": 1,
        "ratings": {"0": 1, "1": null, "4": 0}
    }"#;

    let restored = restore(parse_progress(text).unwrap(), &data).unwrap();
    assert_eq!(
        restored.warnings,
        vec![RestoreWarning::DroppedRatings { positions: vec![4] }]
    );
    assert_eq!(restored.session.rating_at(0), Some(Rating::Match));
    assert_eq!(restored.session.rating_at(4), None);
    assert_eq!(restored.session.phase(), Phase::InProgress);
}

proptest! {
    #[test]
    fn snapshot_restore_round_trip(
        n in 1usize..15,
        actions in proptest::collection::vec(action(), 0..40),
    ) {
        let ids: Vec<i64> = (1..=n as i64).collect();
        let data = dataset(&ids);
        let mut session = RatingSession::new();
        session.start_range(&data, IdRange::new(1, n as i64)).unwrap();
        for action in actions {
            apply(&mut session, action);
        }

        let json = to_json(&snapshot(&session, data.identity()).unwrap()).unwrap();
        let restored = restore(parse_progress(&json).unwrap(), &data).unwrap();

        prop_assert!(restored.warnings.is_empty());
        let resumed = restored.session;
        prop_assert_eq!(resumed.filtered_indices(), session.filtered_indices());
        prop_assert_eq!(resumed.cursor(), session.cursor());
        prop_assert_eq!(resumed.ratings(), session.ratings());

        let all_rated = session.progress().rated == session.len();
        prop_assert_eq!(resumed.phase() == Phase::Completed, all_rated);
    }
}
