#![allow(dead_code)]

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait};
use sql_contest_core::domain::{ContestantId, GradingService, Question, QuestionId};
use sql_contest_server::config::GraderConfig;
use sql_contest_server::entity::{final_score, submission};
use sql_contest_server::{build_grading_service, db};
use tempfile::TempDir;

pub const CHEAPEST_BOOKS: &str = "SELECT * FROM books WHERE price = (SELECT MIN(price) FROM books)";
pub const EXPENSIVE_TITLES: &str = "SELECT title FROM books WHERE price > 20";
pub const GENRE_COUNT: &str = "SELECT COUNT(DISTINCT genre) AS genres FROM books";

pub struct TestContest {
    pub service: GradingService,
    pub store: DatabaseConnection,
    pub dataset: DatabaseConnection,
    pub dataset_path: String,
    // Keeps the database files alive for the duration of the test.
    _dir: TempDir,
}

impl TestContest {
    pub async fn submission_count(&self) -> u64 {
        submission::Entity::find()
            .count(&self.store)
            .await
            .expect("count submissions")
    }

    pub async fn final_score_count(&self) -> u64 {
        final_score::Entity::find()
            .count(&self.store)
            .await
            .expect("count final scores")
    }

    pub async fn book_count(&self) -> i64 {
        self.inspect_count("SELECT COUNT(*) AS n FROM books").await
    }

    pub async fn has_table(&self, name: &str) -> bool {
        let sql = format!(
            "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'table' AND name = '{name}'"
        );
        self.inspect_count(&sql).await > 0
    }

    async fn inspect_count(&self, sql: &str) -> i64 {
        let writable = Database::connect(format!("sqlite://{}?mode=rw", self.dataset_path))
            .await
            .expect("open dataset for inspection");
        let row = writable
            .query_one(sea_orm::Statement::from_string(writable.get_database_backend(), sql))
            .await
            .expect("run inspection query")
            .expect("count row");
        let count = row.try_get::<i64>("", "n").expect("count column");
        writable.close().await.expect("close inspection connection");
        count
    }
}

pub fn contestant(name: &str) -> ContestantId {
    ContestantId::new(name).expect("valid contestant id")
}

pub fn test_config(database_url: &str, dataset_url: &str) -> GraderConfig {
    GraderConfig::from_str(&format!(
        r#"
database_url = "{database_url}"
dataset_url = "{dataset_url}"
query_timeout_ms = 5000
"#
    ))
    .expect("test config should parse")
}

async fn create_bookstore(path: &str) {
    let db = Database::connect(format!("sqlite://{path}?mode=rwc"))
        .await
        .expect("create bookstore database");

    db.execute_unprepared(
        "CREATE TABLE books (
            book_id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            genre TEXT NOT NULL,
            price REAL NOT NULL,
            stock INTEGER NOT NULL
        );
        INSERT INTO books (book_id, title, genre, price, stock) VALUES
            (1, 'Dune', 'Science Fiction', 9.99, 40),
            (2, 'Emma', 'Romance', 4.50, 120),
            (3, 'Walden', 'Nature', 4.50, 15),
            (4, 'Ulysses', 'Modernist', 22.00, 8),
            (5, 'The Hobbit', 'Fantasy', 12.75, 60),
            (6, 'Middlemarch', 'Romance', 24.10, 33);",
    )
    .await
    .expect("seed bookstore");

    db.close().await.expect("close bookstore writer");
}

pub async fn setup() -> TestContest {
    let dir = tempfile::tempdir().expect("create temp dir");
    let dataset_path = dir.path().join("bookstore.db").display().to_string();
    let store_path = dir.path().join("contest.db").display().to_string();

    create_bookstore(&dataset_path).await;

    let config = test_config(
        &format!("sqlite://{store_path}?mode=rwc"),
        &format!("sqlite://{dataset_path}?mode=ro"),
    );
    let store = db::init_store_and_migrate(&config.database_url)
        .await
        .expect("contest store should migrate");
    let dataset = db::connect_dataset(&config.dataset_url)
        .await
        .expect("dataset should open read-only");

    let service = build_grading_service(store.clone(), dataset.clone(), &config);

    for (id, prompt, reference_query) in [
        (1, "Titles of books priced above 20", EXPENSIVE_TITLES),
        (2, "How many distinct genres are stocked?", GENRE_COUNT),
        (7, "List the cheapest books", CHEAPEST_BOOKS),
    ] {
        let inserted = service
            .seed_question(Question {
                id: QuestionId::new(id),
                prompt: prompt.to_string(),
                reference_query: reference_query.to_string(),
            })
            .await
            .expect("question should seed");
        assert!(inserted);
    }

    TestContest {
        service,
        store,
        dataset,
        dataset_path,
        _dir: dir,
    }
}
