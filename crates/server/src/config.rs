use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use sql_contest_core::domain::{DEFAULT_FORBIDDEN_KEYWORDS, Question, QuestionId, SafetyFilter};
type Result<T> = anyhow::Result<T>;

#[derive(Debug, Deserialize)]
pub struct GraderConfig {
    pub database_url: String,
    pub dataset_url: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
    #[serde(default = "default_forbidden_keywords")]
    pub forbidden_keywords: Vec<String>,
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: u64,
    #[serde(default)]
    pub questions: Vec<QuestionConfig>,
}

impl GraderConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("failed to deserialize grader config")
    }

    /// Applies `DATABASE_URL` and `DATASET_URL` from the environment when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database_url = url;
        }
        if let Ok(url) = std::env::var("DATASET_URL") {
            self.dataset_url = url;
        }
        self
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn safety_filter(&self) -> SafetyFilter {
        SafetyFilter::new(&self.forbidden_keywords)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct QuestionConfig {
    pub id: i32,
    pub prompt: String,
    pub reference_query: String,
}

impl From<QuestionConfig> for Question {
    fn from(value: QuestionConfig) -> Self {
        Question {
            id: QuestionId::new(value.id),
            prompt: value.prompt,
            reference_query: value.reference_query,
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_query_timeout_ms() -> u64 {
    5_000
}

fn default_forbidden_keywords() -> Vec<String> {
    DEFAULT_FORBIDDEN_KEYWORDS
        .iter()
        .map(|keyword| keyword.to_string())
        .collect()
}

fn default_leaderboard_size() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::GraderConfig;
    use std::time::Duration;

    #[test]
    fn test_parse_config() {
        let raw = r#"
database_url = "sqlite://contest.db?mode=rwc"
dataset_url = "sqlite://bookstore.db?mode=ro"
query_timeout_ms = 1500
forbidden_keywords = ["drop", "delete", "pragma"]

[[questions]]
id = 7
prompt = "List the cheapest books"
reference_query = "SELECT * FROM books WHERE price = (SELECT MIN(price) FROM books)"

[[questions]]
id = 2
prompt = "How many customers are there?"
reference_query = "SELECT COUNT(*) FROM customers"
"#;

        let config = GraderConfig::from_str(raw).expect("config should parse");
        assert_eq!(config.database_url, "sqlite://contest.db?mode=rwc");
        assert_eq!(config.dataset_url, "sqlite://bookstore.db?mode=ro");
        assert_eq!(config.bind_address, "0.0.0.0:5000");
        assert_eq!(config.query_timeout(), Duration::from_millis(1500));
        assert_eq!(config.leaderboard_size, 10);
        assert_eq!(config.questions.len(), 2);
        assert_eq!(config.questions[0].id, 7);
        assert_eq!(config.questions[1].prompt, "How many customers are there?");

        let filter = config.safety_filter();
        assert_eq!(filter.keywords(), ["DELETE", "DROP", "PRAGMA"]);
    }

    #[test]
    fn test_defaults_apply() {
        let raw = r#"
database_url = "sqlite::memory:"
dataset_url = "sqlite://bookstore.db?mode=ro"
"#;

        let config = GraderConfig::from_str(raw).expect("config should parse");
        assert_eq!(config.query_timeout_ms, 5_000);
        assert!(config.questions.is_empty());
        assert!(config.forbidden_keywords.contains(&"DROP".to_string()));
        assert!(config.safety_filter().check("UPDATE books SET price = 0").is_err());
    }

    #[test]
    fn test_missing_dataset_url_is_rejected() {
        let err = GraderConfig::from_str(r#"database_url = "sqlite::memory:""#)
            .expect_err("dataset_url is required");
        assert!(format!("{err:#}").contains("dataset_url"));
    }
}
