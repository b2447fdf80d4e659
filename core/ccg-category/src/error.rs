use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryError {
    #[error("malformed category `{input}`: {reason}")]
    Parse { input: String, reason: String },

    #[error("empty category string")]
    EmptyCategory,
}
