use std::fmt;

use thiserror::Error;

use super::QuestionId;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("contestant id must not be empty")]
    EmptyContestantId,
    #[error("invalid contestant id length: {0}. at most 128 characters are allowed")]
    InvalidContestantIdLength(usize),
    #[error("query text must not be empty")]
    EmptyQuery,
}

/// Which side of a grading run a query came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryOrigin {
    /// The contestant's submission.
    Submitted,
    /// The operator-authored reference query of a question.
    Reference,
}

impl fmt::Display for QueryOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOrigin::Submitted => f.write_str("submitted"),
            QueryOrigin::Reference => f.write_str("reference"),
        }
    }
}

/// Per-request failures of the grading service.
///
/// Everything except [`GradingError::Storage`] is a recoverable rejection of a
/// single request. `Storage` means the contest store or dataset could not be
/// reached and should surface as a server-side failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GradingError {
    #[error("modifications are not allowed: query contains forbidden keyword '{keyword}'")]
    ForbiddenOperation { keyword: String },
    #[error("{origin} query failed: {message}")]
    Execution { origin: QueryOrigin, message: String },
    #[error("{origin} query exceeded the time budget")]
    ExecutionTimeout { origin: QueryOrigin },
    #[error("an answer has already been submitted for this question")]
    DuplicateSubmission,
    #[error("score already finalized for this contestant")]
    AlreadyFinalized,
    #[error("question {0} not found")]
    QuestionNotFound(QuestionId),
    #[error("invalid input: {0}")]
    InvalidInput(#[from] DomainError),
    #[error("storage unavailable: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_error_names_its_origin() {
        let err = GradingError::Execution {
            origin: QueryOrigin::Reference,
            message: "no such column: prise".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "reference query failed: no such column: prise"
        );
    }
}
