//! Shared application state.

use sql_contest_core::domain::GradingService;

/// State shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Grading engine over the contest store and the dataset.
    pub grading: GradingService,
    /// Number of entries returned by the leaderboard when `n` is omitted.
    pub leaderboard_size: u64,
}

impl AppState {
    pub fn new(grading: GradingService, leaderboard_size: u64) -> Self {
        Self {
            grading,
            leaderboard_size,
        }
    }
}
