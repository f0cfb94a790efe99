//! Integration tests for range selection and session transitions.

use dmr_model::{Dataset, DatasetIdentity, IdRange, MatchRecord, Rating};
use dmr_session::{Advance, Navigation, Phase, RatingSession, SessionError, select_range};
use proptest::prelude::*;

fn dataset(ids: &[i64]) -> Dataset {
    Dataset::from_records(
        DatasetIdentity::new("device_match_humanrating.csv"),
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

#[test]
fn end_to_end_rate_skip_rate() {
    let data = dataset(&[1, 2, 3, 4, 5]);
    let filtered = select_range(&data, IdRange::new(2, 4)).unwrap();
    let ids: Vec<i64> = filtered.iter().map(|&p| data.records()[p].id).collect();
    assert_eq!(ids, vec![2, 3, 4]);

    let mut session = RatingSession::new();
    session.start(filtered, IdRange::new(2, 4)).unwrap();
    assert_eq!(session.phase(), Phase::InProgress);

    assert_eq!(
        session.rate(Rating::Match),
        Ok(Advance::Moved { cursor: 1 })
    );
    assert_eq!(session.skip(), Ok(Advance::Moved { cursor: 2 }));
    assert_eq!(session.rating_at(2), None);
    assert_eq!(session.rate(Rating::NoMatch), Ok(Advance::Completed));

    assert_eq!(session.phase(), Phase::Completed);
    assert_eq!(session.rating_at(1), Some(Rating::Match));
    assert_eq!(session.rating_at(2), None);
    assert_eq!(session.rating_at(3), Some(Rating::NoMatch));
}

#[test]
fn start_range_rejects_invalid_range_without_state_change() {
    let data = dataset(&[1, 2, 3]);
    let mut session = RatingSession::new();
    assert_eq!(
        session.start_range(&data, IdRange::new(3, 2)),
        Err(SessionError::InvalidRange { start: 3, end: 2 })
    );
    assert_eq!(
        session.start_range(&data, IdRange::new(10, 20)),
        Err(SessionError::EmptySelection { start: 10, end: 20 })
    );
    assert_eq!(session, RatingSession::new());
}

#[test]
fn rate_overwrites_and_skip_preserves() {
    let data = dataset(&[1, 2, 3]);
    let mut session = RatingSession::new();
    session.start_range(&data, IdRange::new(1, 3)).unwrap();

    session.rate(Rating::Match).unwrap();
    session.previous().unwrap();
    session.skip().unwrap();
    assert_eq!(session.rating_at(0), Some(Rating::Match));

    session.previous().unwrap();
    session.rate(Rating::NoMatch).unwrap();
    assert_eq!(session.rating_at(0), Some(Rating::NoMatch));
}

#[test]
fn navigation_never_leaves_bounds() {
    let data = dataset(&[1, 2]);
    let mut session = RatingSession::new();
    session.start_range(&data, IdRange::new(1, 2)).unwrap();

    assert_eq!(session.previous(), Ok(Navigation::AtBoundary));
    assert_eq!(session.cursor(), Some(0));
    assert_eq!(session.next(), Ok(Navigation::Moved { cursor: 1 }));
    assert_eq!(session.next(), Ok(Navigation::AtBoundary));
    assert_eq!(session.cursor(), Some(1));
}

proptest! {
    #[test]
    fn selection_is_in_range_and_ordered(
        ids in proptest::collection::hash_set(-50i64..50, 1..40),
        start in -60i64..60,
        len in 0i64..40,
    ) {
        let ids: Vec<i64> = ids.into_iter().collect();
        let data = dataset(&ids);
        let range = IdRange::new(start, start + len);
        match select_range(&data, range) {
            Ok(positions) => {
                prop_assert!(!positions.is_empty());
                prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
                for &p in &positions {
                    prop_assert!(range.contains(data.records()[p].id));
                }
                let expected = ids.iter().filter(|&&id| range.contains(id)).count();
                prop_assert_eq!(positions.len(), expected);
            }
            Err(SessionError::EmptySelection { .. }) => {
                prop_assert!(ids.iter().all(|&id| !range.contains(id)));
            }
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }

    #[test]
    fn reversed_range_is_always_invalid(start in -100i64..100, gap in 1i64..50) {
        let data = dataset(&[start, start - gap]);
        let result = select_range(&data, IdRange::new(start, start - gap));
        let is_invalid_range = matches!(result, Err(SessionError::InvalidRange { .. }));
        prop_assert!(is_invalid_range);
    }

    #[test]
    fn rating_every_item_completes(labels in proptest::collection::vec(any::<bool>(), 1..30)) {
        let n = labels.len();
        let mut session = RatingSession::new();
        session.start((0..n).collect(), IdRange::new(0, n as i64)).unwrap();
        for (i, &is_match) in labels.iter().enumerate() {
            prop_assert_eq!(session.phase(), Phase::InProgress);
            let rating = if is_match { Rating::Match } else { Rating::NoMatch };
            let advance = session.rate(rating).unwrap();
            if i + 1 == n {
                prop_assert_eq!(advance, Advance::Completed);
            }
        }
        prop_assert_eq!(session.phase(), Phase::Completed);
        prop_assert_eq!(session.progress().rated, n);
    }

    #[test]
    fn skipping_every_item_completes_without_ratings(n in 1usize..30) {
        let mut session = RatingSession::new();
        session.start((0..n).collect(), IdRange::new(0, n as i64)).unwrap();
        for _ in 0..n {
            session.skip().unwrap();
        }
        prop_assert_eq!(session.phase(), Phase::Completed);
        prop_assert_eq!(session.progress().rated, 0);
    }
}
