use crate::entity::{final_score, submission};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, OnConflict, Query};
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect};
use sql_contest_core::domain::{ContestantId, FinalScore, ScoreBoard, StorageError};

/// Largest `LIMIT` every backend binds as a signed 64-bit integer.
const MAX_SQL_LIMIT: u64 = i64::MAX as u64;

#[derive(Clone)]
pub struct SeaOrmFinalScoreRepository {
    db: DatabaseConnection,
}

impl SeaOrmFinalScoreRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_model(model: final_score::Model) -> Result<FinalScore> {
        let contestant_id = ContestantId::new(model.contestant_id.as_str()).map_err(|e| {
            anyhow!(
                "invalid final_score.contestant_id '{}' from database: {e}",
                model.contestant_id
            )
        })?;
        let total_score = u32::try_from(model.total_score).map_err(|_| {
            anyhow!(
                "invalid final_score.total_score from database: {} (must be non-negative)",
                model.total_score
            )
        })?;

        Ok(FinalScore {
            contestant_id,
            total_score,
            finalized_at: model.finalized_at,
        })
    }
}

#[async_trait]
impl ScoreBoard for SeaOrmFinalScoreRepository {
    async fn finalize(
        &self,
        contestant_id: &ContestantId,
    ) -> Result<Option<FinalScore>, StorageError> {
        // INSERT INTO final_score (...)
        //   SELECT ?, COALESCE(SUM(correct), 0), ? FROM submission WHERE contestant_id = ?
        //   ON CONFLICT (contestant_id) DO NOTHING
        // Summing and locking happen in one statement, so concurrent finalize
        // calls for a contestant produce exactly one row.
        let totals = Query::select()
            .expr(Expr::val(contestant_id.as_str()))
            .expr(Func::coalesce([
                Expr::col(submission::Column::Correct).sum(),
                Expr::val(0).into(),
            ]))
            .expr(Expr::val(Utc::now()))
            .from(submission::Entity)
            .and_where(Expr::col(submission::Column::ContestantId).eq(contestant_id.as_str()))
            .to_owned();

        let insert = Query::insert()
            .into_table(final_score::Entity)
            .columns([
                final_score::Column::ContestantId,
                final_score::Column::TotalScore,
                final_score::Column::FinalizedAt,
            ])
            .select_from(totals)
            .context("failed to build final score insert")?
            .on_conflict(
                OnConflict::column(final_score::Column::ContestantId)
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();

        let backend = self.db.get_database_backend();
        let result = self
            .db
            .execute(backend.build(&insert))
            .await
            .with_context(|| format!("failed to finalize score of {contestant_id}"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let model = final_score::Entity::find_by_id(contestant_id.to_string())
            .one(&self.db)
            .await
            .with_context(|| format!("failed to load final score of {contestant_id}"))?
            .ok_or_else(|| anyhow!("final score of {contestant_id} vanished after insert"))?;

        Ok(Some(Self::map_model(model)?))
    }

    async fn top(&self, limit: u64) -> Result<Vec<FinalScore>, StorageError> {
        let models = final_score::Entity::find()
            .order_by_desc(final_score::Column::TotalScore)
            .order_by_asc(final_score::Column::FinalizedAt)
            .order_by_asc(final_score::Column::ContestantId)
            .limit(limit.min(MAX_SQL_LIMIT))
            .all(&self.db)
            .await
            .context("failed to load leaderboard")?;

        Ok(models
            .into_iter()
            .map(Self::map_model)
            .collect::<Result<Vec<_>>>()?)
    }
}
