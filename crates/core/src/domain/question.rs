use super::QuestionId;

/// A contest question together with the reference query that defines its answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    pub reference_query: String,
}

impl Question {
    pub fn summary(&self) -> QuestionSummary {
        QuestionSummary {
            id: self.id,
            prompt: self.prompt.clone(),
        }
    }
}

/// The contestant-facing view of a question; never carries the reference query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSummary {
    pub id: QuestionId,
    pub prompt: String,
}
