use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::ContestantId;

/// A contestant's locked-in total. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalScore {
    pub contestant_id: ContestantId,
    pub total_score: u32,
    pub finalized_at: DateTime<Utc>,
}

/// Leaderboard ordering: higher total first, then earlier finalization, then
/// contestant id so that the order is total.
pub fn rank_order(a: &FinalScore, b: &FinalScore) -> Ordering {
    b.total_score
        .cmp(&a.total_score)
        .then_with(|| a.finalized_at.cmp(&b.finalized_at))
        .then_with(|| a.contestant_id.cmp(&b.contestant_id))
}
