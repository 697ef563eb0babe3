//! SQL contest server: sea-orm storage for the grading core, the read-only
//! dataset executor, configuration and HTTP routes.

pub mod api;
pub mod config;
pub mod dataset;
pub mod db;
pub mod entity;
pub mod repository;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sql_contest_core::domain::GradingService;

use crate::config::GraderConfig;
use crate::dataset::SeaOrmDataset;
use crate::repository::{
    SeaOrmFinalScoreRepository, SeaOrmQuestionRepository, SeaOrmSubmissionRepository,
};

/// Wires the sea-orm repositories and dataset into a [`GradingService`].
pub fn build_grading_service(
    store: DatabaseConnection,
    dataset: DatabaseConnection,
    config: &GraderConfig,
) -> GradingService {
    GradingService::new(
        Arc::new(SeaOrmQuestionRepository::new(store.clone())),
        Arc::new(SeaOrmDataset::new(dataset)),
        Arc::new(SeaOrmSubmissionRepository::new(store.clone())),
        Arc::new(SeaOrmFinalScoreRepository::new(store)),
    )
    .with_filter(config.safety_filter())
    .with_query_timeout(config.query_timeout())
}
