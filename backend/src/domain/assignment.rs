//! Lawyer selection shared by case creation and manual re-assignment.
//!
//! Callers load the candidate pool (verified lawyers matching the case
//! specialty, directory order) and pass it here; the persistence adapter
//! runs the whole read-select-write under one transaction with the pool
//! rows locked, so two concurrent submissions cannot pick from the same
//! snapshot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::lawyer::LawyerCandidate;
use crate::domain::user::UserId;

/// Selection policy, as named in API requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AssignmentStrategy {
    #[default]
    #[serde(rename = "roundRobin")]
    RoundRobin,
    #[serde(rename = "leastLoaded")]
    LeastLoaded,
}

impl AssignmentStrategy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RoundRobin => "roundRobin",
            Self::LeastLoaded => "leastLoaded",
        }
    }
}

impl fmt::Display for AssignmentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStrategy(pub String);

impl fmt::Display for UnknownStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown assignment strategy: {}", self.0)
    }
}

impl std::error::Error for UnknownStrategy {}

impl FromStr for AssignmentStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "roundRobin" => Ok(Self::RoundRobin),
            "leastLoaded" => Ok(Self::LeastLoaded),
            other => Err(UnknownStrategy(other.to_owned())),
        }
    }
}

/// Pick a lawyer from `candidates`, which must already be filtered to
/// verified lawyers of the right specialty and sorted in directory order.
///
/// Returns `None` when the pool is empty; the case then stays unassigned.
#[must_use]
pub fn select_lawyer(
    candidates: &[LawyerCandidate],
    strategy: AssignmentStrategy,
) -> Option<UserId> {
    match strategy {
        AssignmentStrategy::RoundRobin => round_robin(candidates),
        AssignmentStrategy::LeastLoaded => least_loaded(candidates),
    }
}

/// The candidate after the pool's most recently assigned member, wrapping.
///
/// When no candidate has ever been assigned (or the previous assignee has
/// left the pool, which presents the same way) the first candidate wins.
fn round_robin(candidates: &[LawyerCandidate]) -> Option<UserId> {
    if candidates.is_empty() {
        return None;
    }
    let most_recent = candidates
        .iter()
        .enumerate()
        .filter_map(|(index, candidate)| {
            candidate.last_assigned_at.map(|at| (index, at))
        })
        .max_by(|(index_a, at_a), (index_b, at_b)| {
            at_a.cmp(at_b).then(index_a.cmp(index_b))
        });
    let next_index = match most_recent {
        Some((index, _)) => (index + 1) % candidates.len(),
        None => 0,
    };
    candidates.get(next_index).map(|c| c.user_id.clone())
}

/// The candidate with the fewest active cases; directory order breaks ties.
fn least_loaded(candidates: &[LawyerCandidate]) -> Option<UserId> {
    candidates
        .iter()
        .min_by_key(|candidate| candidate.active_cases)
        .map(|c| c.user_id.clone())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::*;

    fn candidate(
        id: &UserId,
        active_cases: i64,
        last_assigned_minute: Option<u32>,
    ) -> LawyerCandidate {
        LawyerCandidate {
            user_id: id.clone(),
            active_cases,
            last_assigned_at: last_assigned_minute.map(|minute| {
                Utc.with_ymd_and_hms(2026, 3, 1, 9, minute, 0)
                    .single()
                    .expect("valid timestamp")
            }),
        }
    }

    fn ids(n: usize) -> Vec<UserId> {
        (0..n).map(|_| UserId::random()).collect()
    }

    #[rstest]
    fn empty_pool_assigns_nobody() {
        assert_eq!(select_lawyer(&[], AssignmentStrategy::RoundRobin), None);
        assert_eq!(select_lawyer(&[], AssignmentStrategy::LeastLoaded), None);
    }

    #[rstest]
    fn round_robin_starts_at_the_front_of_a_fresh_pool() {
        let ids = ids(3);
        let pool: Vec<_> = ids.iter().map(|id| candidate(id, 0, None)).collect();
        assert_eq!(
            select_lawyer(&pool, AssignmentStrategy::RoundRobin),
            Some(ids[0].clone())
        );
    }

    #[rstest]
    fn round_robin_advances_past_the_most_recent_assignee() {
        let ids = ids(3);
        let pool = vec![
            candidate(&ids[0], 1, Some(5)),
            candidate(&ids[1], 2, Some(20)),
            candidate(&ids[2], 0, Some(10)),
        ];
        // ids[1] was assigned last, so ids[2] is next.
        assert_eq!(
            select_lawyer(&pool, AssignmentStrategy::RoundRobin),
            Some(ids[2].clone())
        );
    }

    #[rstest]
    fn round_robin_wraps_from_the_end_of_the_pool() {
        let ids = ids(3);
        let pool = vec![
            candidate(&ids[0], 1, Some(5)),
            candidate(&ids[1], 2, Some(10)),
            candidate(&ids[2], 0, Some(20)),
        ];
        assert_eq!(
            select_lawyer(&pool, AssignmentStrategy::RoundRobin),
            Some(ids[0].clone())
        );
    }

    #[rstest]
    fn least_loaded_prefers_the_smallest_caseload() {
        let ids = ids(3);
        let pool = vec![
            candidate(&ids[0], 4, None),
            candidate(&ids[1], 1, None),
            candidate(&ids[2], 3, None),
        ];
        assert_eq!(
            select_lawyer(&pool, AssignmentStrategy::LeastLoaded),
            Some(ids[1].clone())
        );
    }

    #[rstest]
    fn least_loaded_ties_break_in_directory_order() {
        let ids = ids(3);
        let pool = vec![
            candidate(&ids[0], 2, None),
            candidate(&ids[1], 1, None),
            candidate(&ids[2], 1, None),
        ];
        assert_eq!(
            select_lawyer(&pool, AssignmentStrategy::LeastLoaded),
            Some(ids[1].clone())
        );
    }

    #[rstest]
    #[case("roundRobin", AssignmentStrategy::RoundRobin)]
    #[case("leastLoaded", AssignmentStrategy::LeastLoaded)]
    fn strategy_parses_api_names(#[case] raw: &str, #[case] expected: AssignmentStrategy) {
        assert_eq!(raw.parse::<AssignmentStrategy>().expect("valid"), expected);
    }
}
