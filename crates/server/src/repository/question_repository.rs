use crate::entity::question;
use anyhow::Context;
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, DatabaseConnection, EntityTrait, QueryOrder};
use sql_contest_core::domain::{Question, QuestionCatalog, QuestionId, StorageError};

#[derive(Clone)]
pub struct SeaOrmQuestionRepository {
    db: DatabaseConnection,
}

impl SeaOrmQuestionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_model(model: question::Model) -> Question {
        Question {
            id: QuestionId::new(model.id),
            prompt: model.prompt,
            reference_query: model.reference_query,
        }
    }
}

#[async_trait]
impl QuestionCatalog for SeaOrmQuestionRepository {
    async fn find(&self, question_id: QuestionId) -> Result<Option<Question>, StorageError> {
        let model = question::Entity::find_by_id(question_id.value())
            .one(&self.db)
            .await
            .with_context(|| format!("failed to load question {question_id}"))?;

        Ok(model.map(Self::map_model))
    }

    async fn list(&self) -> Result<Vec<Question>, StorageError> {
        let models = question::Entity::find()
            .order_by_asc(question::Column::Id)
            .all(&self.db)
            .await
            .context("failed to list questions")?;

        Ok(models.into_iter().map(Self::map_model).collect())
    }

    async fn seed(&self, new_question: Question) -> Result<bool, StorageError> {
        let question_id = new_question.id;
        let active_model = question::ActiveModel {
            id: Set(question_id.value()),
            prompt: Set(new_question.prompt),
            reference_query: Set(new_question.reference_query),
        };

        let inserted = question::Entity::insert(active_model)
            .on_conflict(
                OnConflict::column(question::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .with_context(|| format!("failed to seed question {question_id}"))?;

        Ok(inserted > 0)
    }
}
