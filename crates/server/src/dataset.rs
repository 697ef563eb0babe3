//! Read-only execution of contestant queries against the reference dataset.

use async_trait::async_trait;
use sea_orm::sqlx::sqlite::SqliteRow;
use sea_orm::sqlx::{self, Column, Row as SqlxRow, TypeInfo, ValueRef};
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, FromQueryResult,
    JsonValue, Statement, TransactionTrait,
};
use sql_contest_core::domain::{Dataset, DatasetError, ResultSet, Row, Scalar};
use tracing::debug;

/// Dataset backed by a sea-orm connection.
///
/// SQLite datasets must come from [`crate::db::connect_dataset`], which opens
/// the file read-only whatever the URL says. Every query runs inside a
/// transaction that is rolled back afterwards; on server backends that
/// transaction is also started `READ ONLY`.
#[derive(Clone)]
pub struct SeaOrmDataset {
    db: DatabaseConnection,
}

impl SeaOrmDataset {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// SQLite cells are decoded by their runtime storage class. Declared
    /// column types are missing for aggregates and expressions.
    async fn execute_sqlite(&self, query: &str) -> Result<ResultSet, DatasetError> {
        let pool = self.db.get_sqlite_connection_pool();
        let mut conn = pool.acquire().await.map_err(map_sqlx_error)?;

        // A query abandoned on timeout may have left its transaction open.
        let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;

        sqlx::query("BEGIN")
            .execute(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
        let rows = sqlx::query(query)
            .persistent(false)
            .fetch_all(&mut *conn)
            .await;
        if let Err(err) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
            // The query text may have ended the transaction itself.
            debug!(error = %err, "dataset rollback failed");
        }

        let rows = rows.map_err(map_sqlx_error)?;
        debug!(rows = rows.len(), "dataset query executed");

        rows.iter().map(map_sqlite_row).collect()
    }

    async fn execute_server(
        &self,
        backend: DatabaseBackend,
        query: &str,
    ) -> Result<ResultSet, DatasetError> {
        let txn = self
            .db
            .begin_with_config(None, Some(AccessMode::ReadOnly))
            .await
            .map_err(|e| DatasetError::Unavailable(e.to_string()))?;

        let rows = JsonValue::find_by_statement(Statement::from_string(backend, query))
            .all(&txn)
            .await;

        if let Err(err) = txn.rollback().await {
            debug!(error = %err, "dataset rollback failed");
        }

        let rows = rows.map_err(map_query_error)?;
        debug!(rows = rows.len(), "dataset query executed");

        rows.into_iter().map(map_row).collect()
    }
}

#[async_trait]
impl Dataset for SeaOrmDataset {
    async fn execute(&self, query: &str) -> Result<ResultSet, DatasetError> {
        match self.db.get_database_backend() {
            DatabaseBackend::Sqlite => self.execute_sqlite(query).await,
            backend => self.execute_server(backend, query).await,
        }
    }
}

fn map_sqlx_error(err: sqlx::Error) -> DatasetError {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_) => DatasetError::Unavailable(err.to_string()),
        other => DatasetError::Query(other.to_string()),
    }
}

fn map_sqlite_row(row: &SqliteRow) -> Result<Row, DatasetError> {
    row.columns()
        .iter()
        .map(|column| Ok((column.name().to_string(), map_sqlite_cell(row, column.ordinal())?)))
        .collect()
}

fn map_sqlite_cell(row: &SqliteRow, index: usize) -> Result<Scalar, DatasetError> {
    let raw = row.try_get_raw(index).map_err(map_sqlx_error)?;
    if raw.is_null() {
        return Ok(Scalar::Null);
    }
    let storage_class = raw.type_info().name().to_string();

    let scalar = match storage_class.as_str() {
        "INTEGER" => Scalar::Integer(row.try_get_unchecked(index).map_err(map_sqlx_error)?),
        "REAL" => Scalar::Real(row.try_get_unchecked(index).map_err(map_sqlx_error)?),
        "BLOB" => Scalar::Blob(row.try_get_unchecked(index).map_err(map_sqlx_error)?),
        _ => Scalar::Text(row.try_get_unchecked(index).map_err(map_sqlx_error)?),
    };

    Ok(scalar)
}

fn map_query_error(err: DbErr) -> DatasetError {
    match err {
        DbErr::Conn(e) => DatasetError::Unavailable(e.to_string()),
        DbErr::ConnectionAcquire(e) => DatasetError::Unavailable(e.to_string()),
        DbErr::Query(e) | DbErr::Exec(e) => DatasetError::Query(e.to_string()),
        other => DatasetError::Query(other.to_string()),
    }
}

fn map_row(row: JsonValue) -> Result<Row, DatasetError> {
    match row {
        JsonValue::Object(columns) => Ok(columns
            .into_iter()
            .map(|(column, value)| (column, map_scalar(value)))
            .collect()),
        other => Err(DatasetError::Query(format!(
            "unexpected row shape from dataset: {other}"
        ))),
    }
}

fn map_scalar(value: JsonValue) -> Scalar {
    match value {
        JsonValue::Null => Scalar::Null,
        JsonValue::Bool(b) => Scalar::Bool(b),
        JsonValue::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Scalar::Integer(i),
            (None, Some(f)) => Scalar::Real(f),
            (None, None) => Scalar::Text(n.to_string()),
        },
        JsonValue::String(s) => Scalar::Text(s),
        other => Scalar::Text(other.to_string()),
    }
}
