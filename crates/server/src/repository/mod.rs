mod final_score_repository;
mod question_repository;
mod submission_repository;

pub use final_score_repository::SeaOrmFinalScoreRepository;
pub use question_repository::SeaOrmQuestionRepository;
pub use submission_repository::SeaOrmSubmissionRepository;
