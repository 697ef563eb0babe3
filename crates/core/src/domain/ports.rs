use async_trait::async_trait;
use thiserror::Error;

use super::{
    ContestantId, FinalScore, NewSubmission, Question, QuestionId, ResultSet, SubmissionRecord,
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DatasetError {
    /// The engine rejected or failed the query itself.
    #[error("{0}")]
    Query(String),
    /// No connection to the dataset could be obtained.
    #[error("dataset unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("contest store error: {0}")]
pub struct StorageError(pub String);

impl From<anyhow::Error> for StorageError {
    fn from(err: anyhow::Error) -> Self {
        Self(format!("{err:#}"))
    }
}

/// Read-only access to the reference dataset contestants query.
///
/// Implementations must not let a query change dataset state, whatever text
/// it contains.
#[async_trait]
pub trait Dataset: Send + Sync {
    async fn execute(&self, query: &str) -> Result<ResultSet, DatasetError>;
}

#[async_trait]
pub trait QuestionCatalog: Send + Sync {
    async fn find(&self, question_id: QuestionId) -> Result<Option<Question>, StorageError>;
    async fn list(&self) -> Result<Vec<Question>, StorageError>;
    /// Inserts the question unless its id is already taken. Returns whether
    /// a row was written.
    async fn seed(&self, question: Question) -> Result<bool, StorageError>;
}

#[async_trait]
pub trait SubmissionLedger: Send + Sync {
    /// Atomically stores the submission unless one already exists for the
    /// same (contestant, question) pair, in which case `None` is returned.
    async fn record(
        &self,
        submission: NewSubmission,
    ) -> Result<Option<SubmissionRecord>, StorageError>;
    async fn find(
        &self,
        contestant_id: &ContestantId,
        question_id: QuestionId,
    ) -> Result<Option<SubmissionRecord>, StorageError>;
    async fn list_by_contestant(
        &self,
        contestant_id: &ContestantId,
    ) -> Result<Vec<SubmissionRecord>, StorageError>;
}

#[async_trait]
pub trait ScoreBoard: Send + Sync {
    /// Sums the contestant's correctness bits and stores the total in the
    /// same atomic step. Returns `None` when a final score already exists.
    async fn finalize(
        &self,
        contestant_id: &ContestantId,
    ) -> Result<Option<FinalScore>, StorageError>;
    /// The `limit` best final scores in [`super::rank_order`].
    async fn top(&self, limit: u64) -> Result<Vec<FinalScore>, StorageError>;
}

impl From<StorageError> for super::GradingError {
    fn from(err: StorageError) -> Self {
        super::GradingError::Storage(err.0)
    }
}
