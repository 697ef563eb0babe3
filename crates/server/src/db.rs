use anyhow::Context;
use sea_orm::sqlx::ConnectOptions as _;
use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sea_orm::{ConnectOptions, Database, DatabaseBackend, DatabaseConnection, SqlxSqliteConnector};
use sql_contest_migration::{Migrator, MigratorTrait};
use std::str::FromStr;
use std::time::Duration;

const DATASET_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connects to the contest store and brings its schema up to date.
pub async fn init_store_and_migrate(database_url: &str) -> anyhow::Result<DatabaseConnection> {
    let db = Database::connect(database_url)
        .await
        .context("failed to connect to contest store")?;

    Migrator::up(&db, None)
        .await
        .context("failed to run contest store migrations")?;

    Ok(db)
}

/// Connects to the reference dataset. SQLite files are always opened
/// read-only, even when the URL asks for `mode=rw` or `mode=rwc`.
pub async fn connect_dataset(dataset_url: &str) -> anyhow::Result<DatabaseConnection> {
    if DatabaseBackend::Sqlite.is_prefix_of(dataset_url) {
        let options = SqliteConnectOptions::from_str(dataset_url)
            .with_context(|| format!("invalid sqlite dataset url: {dataset_url}"))?
            .read_only(true)
            .disable_statement_logging();
        let pool = SqlitePoolOptions::new()
            .acquire_timeout(DATASET_ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await
            .context("failed to open sqlite dataset")?;

        return Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool));
    }

    let mut options = ConnectOptions::new(dataset_url);
    options
        .acquire_timeout(DATASET_ACQUIRE_TIMEOUT)
        .sqlx_logging(false);

    Database::connect(options)
        .await
        .context("failed to connect to dataset")
}
