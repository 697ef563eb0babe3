use crate::entity::submission;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use sql_contest_core::domain::{
    ContestantId, NewSubmission, QuestionId, StorageError, SubmissionId, SubmissionLedger,
    SubmissionRecord,
};
use std::str::FromStr;

#[derive(Clone)]
pub struct SeaOrmSubmissionRepository {
    db: DatabaseConnection,
}

impl SeaOrmSubmissionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_correct(code: i16) -> Result<bool> {
        match code {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(anyhow!("invalid submission.correct code from database: {code}")),
        }
    }

    fn map_correct_code(correct: bool) -> i16 {
        i16::from(correct)
    }

    fn map_model(model: submission::Model) -> Result<SubmissionRecord> {
        let id = SubmissionId::from_str(&model.id)
            .map_err(|e| anyhow!("invalid submission.id '{}' from database: {e}", model.id))?;
        let contestant_id = ContestantId::new(model.contestant_id.as_str()).map_err(|e| {
            anyhow!(
                "invalid submission.contestant_id '{}' from database: {e}",
                model.contestant_id
            )
        })?;

        Ok(SubmissionRecord {
            id,
            contestant_id,
            question_id: QuestionId::new(model.question_id),
            query_text: model.query_text,
            correct: Self::map_correct(model.correct)?,
            created_at: model.created_at,
        })
    }
}

#[async_trait]
impl SubmissionLedger for SeaOrmSubmissionRepository {
    async fn record(
        &self,
        new_submission: NewSubmission,
    ) -> Result<Option<SubmissionRecord>, StorageError> {
        let record = SubmissionRecord {
            id: SubmissionId::new(),
            contestant_id: new_submission.contestant_id,
            question_id: new_submission.question_id,
            query_text: new_submission.query_text,
            correct: new_submission.correct,
            created_at: Utc::now(),
        };

        let active_model = submission::ActiveModel {
            id: Set(record.id.to_string()),
            contestant_id: Set(record.contestant_id.to_string()),
            question_id: Set(record.question_id.value()),
            query_text: Set(record.query_text.clone()),
            correct: Set(Self::map_correct_code(record.correct)),
            created_at: Set(record.created_at),
        };

        // Single conditional insert keyed by the unique (contestant, question)
        // index. Zero affected rows means another submission got there first.
        let inserted = submission::Entity::insert(active_model)
            .on_conflict(
                OnConflict::columns([
                    submission::Column::ContestantId,
                    submission::Column::QuestionId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("failed to insert submission")?;

        if inserted == 0 {
            return Ok(None);
        }

        Ok(Some(record))
    }

    async fn find(
        &self,
        contestant_id: &ContestantId,
        question_id: QuestionId,
    ) -> Result<Option<SubmissionRecord>, StorageError> {
        let model = submission::Entity::find()
            .filter(submission::Column::ContestantId.eq(contestant_id.as_str()))
            .filter(submission::Column::QuestionId.eq(question_id.value()))
            .one(&self.db)
            .await
            .context("failed to look up submission")?;

        Ok(model.map(Self::map_model).transpose()?)
    }

    async fn list_by_contestant(
        &self,
        contestant_id: &ContestantId,
    ) -> Result<Vec<SubmissionRecord>, StorageError> {
        let models = submission::Entity::find()
            .filter(submission::Column::ContestantId.eq(contestant_id.as_str()))
            .order_by_asc(submission::Column::QuestionId)
            .all(&self.db)
            .await
            .with_context(|| format!("failed to list submissions of {contestant_id}"))?;

        Ok(models
            .into_iter()
            .map(Self::map_model)
            .collect::<Result<Vec<_>>>()?)
    }
}
