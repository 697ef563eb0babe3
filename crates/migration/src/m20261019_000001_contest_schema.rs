use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Question::Table)
                    .if_not_exists()
                    .col(integer(Question::Id).primary_key())
                    .col(text(Question::Prompt))
                    .col(text(Question::ReferenceQuery))
                    .col(
                        timestamp_with_time_zone(Question::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Submission::Table)
                    .if_not_exists()
                    .col(string_len(Submission::Id, 36).primary_key())
                    .col(string_len(Submission::ContestantId, 128))
                    .col(integer(Submission::QuestionId))
                    .col(text(Submission::QueryText))
                    // Correctness bit: 0=incorrect, 1=correct. Summed by finalize.
                    .col(
                        small_integer(Submission::Correct)
                            .check(Expr::col(Submission::Correct).gte(0))
                            .check(Expr::col(Submission::Correct).lte(1)),
                    )
                    .col(timestamp_with_time_zone(Submission::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-submission-question_id")
                            .from(Submission::Table, Submission::QuestionId)
                            .to(Question::Table, Question::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // One answer per contestant and question. Inserts rely on this index
        // to reject the second of two concurrent submissions.
        manager
            .create_index(
                Index::create()
                    .name("idx_submission_contestant_question")
                    .table(Submission::Table)
                    .col(Submission::ContestantId)
                    .col(Submission::QuestionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FinalScore::Table)
                    .if_not_exists()
                    .col(string_len(FinalScore::ContestantId, 128).primary_key())
                    .col(
                        integer(FinalScore::TotalScore)
                            .check(Expr::col(FinalScore::TotalScore).gte(0)),
                    )
                    .col(timestamp_with_time_zone(FinalScore::FinalizedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_final_score_ranking")
                    .table(FinalScore::Table)
                    .col(FinalScore::TotalScore)
                    .col(FinalScore::FinalizedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FinalScore::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Submission::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Question::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Question {
    Table,
    Id,
    Prompt,
    ReferenceQuery,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Submission {
    Table,
    Id,
    ContestantId,
    QuestionId,
    QueryText,
    Correct,
    CreatedAt,
}

#[derive(DeriveIden)]
enum FinalScore {
    Table,
    ContestantId,
    TotalScore,
    FinalizedAt,
}
