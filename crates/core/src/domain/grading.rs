use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use super::{
    ContestantId, Dataset, DatasetError, FinalScore, GradingError, NewSubmission, Question,
    QuestionCatalog, QuestionId, QuestionSummary, QueryOrigin, ResultSet, SafetyFilter,
    ScoreBoard, SubmissionLedger, SubmissionRecord, Verdict,
};

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Grades contestant queries against the reference dataset and keeps the
/// one-answer-per-question and one-final-score-per-contestant rules.
///
/// Holds no mutable state of its own; every call is an independent unit of
/// work and the exactly-once guarantees come from the storage ports.
#[derive(Clone)]
pub struct GradingService {
    questions: Arc<dyn QuestionCatalog>,
    dataset: Arc<dyn Dataset>,
    ledger: Arc<dyn SubmissionLedger>,
    scores: Arc<dyn ScoreBoard>,
    filter: SafetyFilter,
    query_timeout: Duration,
}

impl GradingService {
    pub fn new(
        questions: Arc<dyn QuestionCatalog>,
        dataset: Arc<dyn Dataset>,
        ledger: Arc<dyn SubmissionLedger>,
        scores: Arc<dyn ScoreBoard>,
    ) -> Self {
        Self {
            questions,
            dataset,
            ledger,
            scores,
            filter: SafetyFilter::default(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_filter(mut self, filter: SafetyFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    pub fn filter(&self) -> &SafetyFilter {
        &self.filter
    }

    /// Screens, runs and grades a query, then records the verdict.
    ///
    /// Nothing is stored when the query is rejected, fails or times out, so
    /// the contestant keeps their attempt for that question.
    #[tracing::instrument(skip(self, query_text), fields(contestant_id = %contestant_id, question_id = %question_id))]
    pub async fn submit(
        &self,
        contestant_id: &ContestantId,
        question_id: QuestionId,
        query_text: &str,
    ) -> Result<Verdict, GradingError> {
        let query = self.filter.check(query_text).inspect_err(|err| {
            info!(error = %err, "submission rejected by safety filter");
        })?;

        let question = self
            .questions
            .find(question_id)
            .await?
            .ok_or(GradingError::QuestionNotFound(question_id))?;

        // Fast path only; the conditional insert below is what decides.
        if self.ledger.find(contestant_id, question_id).await?.is_some() {
            info!("question already answered");
            return Err(GradingError::DuplicateSubmission);
        }

        let submitted = self.run(query, QueryOrigin::Submitted).await?;
        let reference = self
            .run(&question.reference_query, QueryOrigin::Reference)
            .await?;
        let correct = submitted.equivalent(&reference);

        let record = self
            .ledger
            .record(NewSubmission {
                contestant_id: contestant_id.clone(),
                question_id,
                query_text: query_text.to_string(),
                correct,
            })
            .await?
            .ok_or_else(|| {
                info!("lost race for question, submission discarded");
                GradingError::DuplicateSubmission
            })?;

        info!(submission_id = %record.id, correct, "submission recorded");

        Ok(Verdict {
            submission_id: record.id,
            correct,
        })
    }

    /// Runs a screened query without grading or recording it.
    #[tracing::instrument(skip(self, query_text))]
    pub async fn preview(&self, query_text: &str) -> Result<ResultSet, GradingError> {
        let query = self.filter.check(query_text)?;
        self.run(query, QueryOrigin::Submitted).await
    }

    /// Locks in the contestant's total from the submissions stored right now.
    #[tracing::instrument(skip(self), fields(contestant_id = %contestant_id))]
    pub async fn finalize(&self, contestant_id: &ContestantId) -> Result<FinalScore, GradingError> {
        let Some(score) = self.scores.finalize(contestant_id).await? else {
            info!("final score already exists");
            return Err(GradingError::AlreadyFinalized);
        };

        info!(total_score = score.total_score, "final score locked");
        Ok(score)
    }

    pub async fn leaderboard(&self, limit: u64) -> Result<Vec<FinalScore>, GradingError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        Ok(self.scores.top(limit).await?)
    }

    pub async fn progress(
        &self,
        contestant_id: &ContestantId,
    ) -> Result<Vec<SubmissionRecord>, GradingError> {
        let mut submissions = self.ledger.list_by_contestant(contestant_id).await?;
        submissions.sort_by_key(|submission| submission.question_id);
        Ok(submissions)
    }

    pub async fn questions(&self) -> Result<Vec<QuestionSummary>, GradingError> {
        let mut questions: Vec<QuestionSummary> = self
            .questions
            .list()
            .await?
            .iter()
            .map(Question::summary)
            .collect();
        questions.sort_by_key(|question| question.id);
        Ok(questions)
    }

    /// Provisioning hook. Questions are immutable, so seeding an existing id
    /// keeps the stored question and returns `false`.
    #[tracing::instrument(skip(self, question), fields(question_id = %question.id))]
    pub async fn seed_question(&self, question: Question) -> Result<bool, GradingError> {
        self.filter.check(&question.reference_query)?;

        let candidate = question.clone();
        let inserted = self.questions.seed(question).await?;
        if inserted {
            info!("question seeded");
            return Ok(true);
        }

        match self.questions.find(candidate.id).await? {
            Some(existing) if existing != candidate => {
                warn!("question already exists with different content, keeping stored version");
            }
            _ => info!("question already seeded"),
        }

        Ok(false)
    }

    async fn run(&self, query: &str, origin: QueryOrigin) -> Result<ResultSet, GradingError> {
        match tokio::time::timeout(self.query_timeout, self.dataset.execute(query)).await {
            Ok(Ok(rows)) => Ok(rows),
            Ok(Err(DatasetError::Query(message))) => {
                match origin {
                    QueryOrigin::Submitted => info!(error = %message, "submitted query failed"),
                    QueryOrigin::Reference => error!(
                        error = %message,
                        "reference query failed, question is misconfigured"
                    ),
                }
                Err(GradingError::Execution { origin, message })
            }
            Ok(Err(DatasetError::Unavailable(message))) => {
                error!(error = %message, "dataset unavailable");
                Err(GradingError::Storage(message))
            }
            Err(_) => {
                warn!(
                    %origin,
                    timeout_ms = self.query_timeout.as_millis() as u64,
                    "query timed out"
                );
                Err(GradingError::ExecutionTimeout { origin })
            }
        }
    }
}
