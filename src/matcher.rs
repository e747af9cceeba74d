//! Reaction matching across the platoon
//!
//! Starting from a leader transition, each vehicle is matched to a transition of
//! its own that falls within `match_tolerance` after the reference set by the
//! vehicle ahead. Matching walks the platoon front to back; each level depends
//! on the anchor chosen by the level before it, so it is inherently sequential.
//!
//! Selection rule per level:
//! - intermediate vehicle: candidates are `reference <= t <= reference + tol`;
//!   the first candidate is reported and the last one anchors the next level
//! - last vehicle: the first `t` with `reference < t <= reference + tol`
//!
//! A level without candidates ends the match; whatever prefix was collected is
//! returned and the caller decides whether it is usable.

use crate::types::ReactionTuple;
use tracing::warn;

/// Match one event across `series` (detection times per vehicle, leader first).
///
/// Without a `reference`, the first leader detection seeds the match. Returns
/// one instant per matched vehicle, which can be fewer than `series.len()`.
pub fn consecutive_times(series: &[Vec<f64>], reference: Option<f64>, tolerance: f64) -> Vec<f64> {
    let seed = reference.or_else(|| series.first().and_then(|head| head.first().copied()));
    match seed {
        Some(reference) => match_from(series, reference, tolerance),
        None => Vec::new(),
    }
}

fn match_from(series: &[Vec<f64>], reference: f64, tolerance: f64) -> Vec<f64> {
    let Some((head, rest)) = series.split_first() else {
        return Vec::new();
    };
    let upper = reference + tolerance;

    if rest.is_empty() {
        return head
            .iter()
            .copied()
            .find(|t| *t > reference && *t <= upper)
            .into_iter()
            .collect();
    }

    let candidates: Vec<f64> = head
        .iter()
        .copied()
        .filter(|t| *t >= reference && *t <= upper)
        .collect();

    let (Some(&first), Some(&anchor)) = (candidates.first(), candidates.last()) else {
        return Vec::new();
    };

    let mut matched = vec![first];
    matched.extend(match_from(rest, anchor, tolerance));
    matched
}

/// Result of matching every leader transition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    /// Complete matches, one per usable leader transition
    pub tuples: Vec<ReactionTuple>,
    /// Leader transitions whose match ended before the last vehicle
    pub discarded: usize,
}

/// Matcher applying a fixed tolerance window
#[derive(Debug, Clone, Copy)]
pub struct ConsecutiveMatcher {
    tolerance: f64,
}

impl ConsecutiveMatcher {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Match a single leader transition
    pub fn match_event(&self, detection_times: &[Vec<f64>], leader_time: f64) -> Vec<f64> {
        consecutive_times(detection_times, Some(leader_time), self.tolerance)
    }

    /// Match every leader transition and keep only complete tuples
    pub fn reaction_tuples(&self, detection_times: &[Vec<f64>]) -> MatchOutcome {
        let Some(leader_times) = detection_times.first() else {
            return MatchOutcome::default();
        };

        let mut outcome = MatchOutcome::default();
        for &leader_time in leader_times {
            let matched = self.match_event(detection_times, leader_time);
            match ReactionTuple::try_from(matched) {
                Ok(tuple) => outcome.tuples.push(tuple),
                Err(partial) => {
                    warn!(
                        leader_time,
                        matched_vehicles = partial.len(),
                        "Reaction match ended short, discarding"
                    );
                    outcome.discarded += 1;
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TOLERANCE: f64 = 20.0;

    #[test]
    fn test_follower_matched_within_window() {
        let series = vec![vec![5.0, 40.0], vec![7.0, 41.0]];

        assert_eq!(consecutive_times(&series, Some(5.0), TOLERANCE), vec![5.0, 7.0]);
        assert_eq!(consecutive_times(&series, Some(40.0), TOLERANCE), vec![40.0, 41.0]);
    }

    #[test]
    fn test_default_seed_is_first_leader_time() {
        let series = vec![vec![5.0, 40.0], vec![7.0, 41.0]];

        assert_eq!(consecutive_times(&series, None, TOLERANCE), vec![5.0, 7.0]);
        assert!(consecutive_times(&[vec![], vec![1.0]], None, TOLERANCE).is_empty());
        assert!(consecutive_times(&[], None, TOLERANCE).is_empty());
    }

    #[test]
    fn test_last_candidate_anchors_next_level() {
        // vehicle 1 has two candidates; the later one (15) anchors vehicle 2,
        // so 10 is out of reach and 34 is chosen
        let series = vec![vec![0.0], vec![2.0, 15.0], vec![10.0, 34.0]];

        assert_eq!(
            consecutive_times(&series, Some(0.0), TOLERANCE),
            vec![0.0, 2.0, 34.0]
        );
    }

    #[test]
    fn test_last_vehicle_requires_strictly_later_time() {
        let series = vec![vec![3.0], vec![3.0, 4.0]];
        assert_eq!(consecutive_times(&series, Some(3.0), TOLERANCE), vec![3.0, 4.0]);

        // an intermediate vehicle accepts an equal time
        let series = vec![vec![3.0], vec![3.0], vec![3.5]];
        assert_eq!(
            consecutive_times(&series, Some(3.0), TOLERANCE),
            vec![3.0, 3.0, 3.5]
        );
    }

    #[test]
    fn test_missing_candidate_returns_prefix() {
        let series = vec![vec![0.0], vec![50.0]];
        assert_eq!(consecutive_times(&series, Some(0.0), TOLERANCE), vec![0.0]);

        let series = vec![vec![0.0], vec![50.0], vec![51.0]];
        assert_eq!(consecutive_times(&series, Some(0.0), TOLERANCE), vec![0.0]);

        let series = vec![vec![0.0], vec![5.0], vec![50.0]];
        assert_eq!(consecutive_times(&series, Some(0.0), TOLERANCE), vec![0.0, 5.0]);
    }

    #[test]
    fn test_window_upper_bound_inclusive() {
        let series = vec![vec![0.0], vec![20.0]];
        assert_eq!(consecutive_times(&series, Some(0.0), TOLERANCE), vec![0.0, 20.0]);

        let series = vec![vec![0.0], vec![20.5]];
        assert_eq!(consecutive_times(&series, Some(0.0), TOLERANCE), vec![0.0]);
    }

    #[test]
    fn test_vehicle_without_detections_yields_no_tuples() {
        let detection_times = vec![
            vec![5.0, 60.0, 120.0],
            vec![6.0, 61.0, 121.0],
            vec![],
            vec![8.0, 63.0, 123.0],
            vec![9.0, 64.0, 124.0],
        ];

        let outcome = ConsecutiveMatcher::new(TOLERANCE).reaction_tuples(&detection_times);
        assert!(outcome.tuples.is_empty());
        assert_eq!(outcome.discarded, 3);
    }

    #[test]
    fn test_reaction_tuples_are_ordered() {
        let detection_times = vec![
            vec![5.0, 60.0, 120.0],
            vec![6.0, 12.0, 61.5, 200.0],
            vec![7.5, 14.0, 63.0],
            vec![16.0, 64.0, 125.0],
            vec![17.0, 66.0],
        ];

        let outcome = ConsecutiveMatcher::new(TOLERANCE).reaction_tuples(&detection_times);

        // 7.5 is skipped: vehicle 1 anchors at 12.0, not 6.0
        assert_eq!(
            outcome.tuples,
            vec![
                ReactionTuple([5.0, 6.0, 14.0, 16.0, 17.0]),
                ReactionTuple([60.0, 61.5, 63.0, 64.0, 66.0]),
            ]
        );
        assert_eq!(outcome.discarded, 1);

        for tuple in &outcome.tuples {
            assert!(tuple.instants().windows(2).all(|pair| pair[0] <= pair[1]));
        }
    }

    #[test]
    fn test_matching_is_deterministic() {
        let detection_times = vec![
            vec![1.0, 30.0],
            vec![2.0, 31.0],
            vec![3.0, 33.0],
            vec![4.0, 34.0],
            vec![5.0, 36.0],
        ];
        let matcher = ConsecutiveMatcher::new(TOLERANCE);

        let first = matcher.reaction_tuples(&detection_times);
        let second = matcher.reaction_tuples(&detection_times);
        assert_eq!(first, second);
        assert_eq!(first.tuples.len(), 2);
    }
}
