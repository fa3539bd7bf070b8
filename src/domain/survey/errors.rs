use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the survey aggregate and its repository
///
/// These surface to the language model as tool-call failures, so each
/// message stays short and names the offending value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurveyError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("survey not found: {0}")]
    SurveyNotFound(Uuid),

    #[error("question not found: {0}")]
    QuestionNotFound(Uuid),

    /// A survey reference that is not a valid id
    #[error("survey not found: {0}")]
    UnknownSurveyRef(String),

    /// A question reference that is not a valid id
    #[error("question not found: {0}")]
    UnknownQuestionRef(String),

    #[error("unknown question type: {0}")]
    UnknownQuestionType(String),

    #[error("missing options for choice type {0}")]
    MissingOptions(String),

    #[error("invalid field value: {0}")]
    InvalidFieldValue(String),

    #[error("repository error: {0}")]
    Repository(String),
}

pub type SurveyResult<T> = Result<T, SurveyError>;
