use super::{DomainError, GradingError};

pub const DEFAULT_FORBIDDEN_KEYWORDS: &[&str] = &[
    "DROP", "DELETE", "INSERT", "UPDATE", "ALTER", "TRUNCATE", "CREATE", "REPLACE", "ATTACH",
];

/// Coarse lexical screen for mutating statements.
///
/// This is a substring match on the upper-cased query text, not a parser. It
/// blocks a keyword wherever it appears, including inside string literals and
/// identifiers such as `last_updated`, and it lets through anything that
/// spells a keyword differently (`dr op`, comments splitting a word). The
/// read-only dataset connection is what actually keeps the data intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyFilter {
    keywords: Vec<String>,
}

impl SafetyFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keywords: Vec<String> = keywords
            .into_iter()
            .map(|keyword| keyword.as_ref().trim().to_uppercase())
            .filter(|keyword| !keyword.is_empty())
            .collect();
        keywords.sort();
        keywords.dedup();

        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Returns the query unchanged when no forbidden keyword occurs in it.
    pub fn check<'q>(&self, query: &'q str) -> Result<&'q str, GradingError> {
        if query.trim().is_empty() {
            return Err(DomainError::EmptyQuery.into());
        }

        let upper = query.to_uppercase();
        match self.keywords.iter().find(|keyword| upper.contains(keyword.as_str())) {
            Some(keyword) => Err(GradingError::ForbiddenOperation {
                keyword: keyword.clone(),
            }),
            None => Ok(query),
        }
    }
}

impl Default for SafetyFilter {
    fn default() -> Self {
        Self::new(DEFAULT_FORBIDDEN_KEYWORDS)
    }
}
