mod error;
mod grading;
mod ids;
mod ports;
mod question;
mod result_set;
mod safety_filter;
mod score;
mod submission;

pub use error::{DomainError, GradingError, QueryOrigin};
pub use grading::{GradingService, DEFAULT_QUERY_TIMEOUT};
pub use ids::{ContestantId, QuestionId, SubmissionId};
pub use ports::{Dataset, DatasetError, QuestionCatalog, ScoreBoard, StorageError, SubmissionLedger};
pub use question::{Question, QuestionSummary};
pub use result_set::{ResultSet, Row, Scalar};
pub use safety_filter::{DEFAULT_FORBIDDEN_KEYWORDS, SafetyFilter};
pub use score::{FinalScore, rank_order};
pub use submission::{NewSubmission, SubmissionRecord, Verdict};
