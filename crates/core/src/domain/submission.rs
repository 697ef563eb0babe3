use chrono::{DateTime, Utc};

use super::{ContestantId, QuestionId, SubmissionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    pub contestant_id: ContestantId,
    pub question_id: QuestionId,
    pub query_text: String,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    pub contestant_id: ContestantId,
    pub question_id: QuestionId,
    pub query_text: String,
    pub correct: bool,
    pub created_at: DateTime<Utc>,
}

impl SubmissionRecord {
    /// The correctness bit as stored and summed by the score aggregator.
    pub fn score(&self) -> u32 {
        u32::from(self.correct)
    }
}

/// Outcome of a graded and recorded submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub submission_id: SubmissionId,
    pub correct: bool,
}
