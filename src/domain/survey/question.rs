use serde::Serialize;
use uuid::Uuid;

use super::errors::{SurveyError, SurveyResult};
use super::value_objects::{QuestionOptions, QuestionType};

/// A single question inside a Survey
///
/// Questions have no identity outside their survey; the id is only
/// unique within the parent.
///
/// # Invariants
/// - Text cannot be empty
/// - Choice types carry a non-empty option list
/// - Non-choice types carry no options
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    id: Uuid,
    text: String,
    question_type: QuestionType,
    options: Option<Vec<String>>,
    question_options: QuestionOptions,
}

/// Partial update applied by `edit_question`
///
/// Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionUpdate {
    pub text: Option<String>,
    pub question_type: Option<QuestionType>,
    pub options: Option<Vec<String>>,
    pub question_options: Option<QuestionOptions>,
}

impl QuestionUpdate {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.question_type.is_none()
            && self.options.is_none()
            && self.question_options.is_none()
    }
}

impl Question {
    /// Creates a new Question, enforcing the option invariants
    ///
    /// Options are trimmed and blank entries dropped before the choice
    /// check. Options supplied for a non-choice type are discarded.
    pub fn new(
        text: String,
        question_type: QuestionType,
        options: Option<Vec<String>>,
        question_options: QuestionOptions,
    ) -> SurveyResult<Self> {
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(SurveyError::InvalidInput(
                "question text cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            text,
            question_type,
            options: normalize_options(question_type, options)?,
            question_options,
        })
    }

    /// Applies a partial update atomically
    ///
    /// On error the question is left unchanged.
    pub fn apply(&mut self, update: QuestionUpdate) -> SurveyResult<()> {
        if update.is_empty() {
            return Err(SurveyError::InvalidFieldValue(
                "no fields to update".to_string(),
            ));
        }

        let text = match update.text {
            Some(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Err(SurveyError::InvalidFieldValue(
                        "question text cannot be empty".to_string(),
                    ));
                }
                text
            }
            None => self.text.clone(),
        };

        let question_type = update.question_type.unwrap_or(self.question_type);
        let options = normalize_options(
            question_type,
            update.options.or_else(|| self.options.clone()),
        )?;

        self.text = text;
        self.question_type = question_type;
        self.options = options;
        if let Some(question_options) = update.question_options {
            self.question_options = question_options;
        }

        Ok(())
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn question_type(&self) -> QuestionType {
        self.question_type
    }

    pub fn options(&self) -> Option<&[String]> {
        self.options.as_deref()
    }

    pub fn question_options(&self) -> &QuestionOptions {
        &self.question_options
    }

    /// Reconstructs a Question from stored data without re-validation
    pub fn from_persistence(
        id: Uuid,
        text: String,
        question_type: QuestionType,
        options: Option<Vec<String>>,
        question_options: QuestionOptions,
    ) -> Self {
        Self {
            id,
            text,
            question_type,
            options,
            question_options,
        }
    }
}

fn normalize_options(
    question_type: QuestionType,
    options: Option<Vec<String>>,
) -> SurveyResult<Option<Vec<String>>> {
    if !question_type.is_choice() {
        return Ok(None);
    }

    let options: Vec<String> = options
        .unwrap_or_default()
        .into_iter()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect();

    if options.is_empty() {
        return Err(SurveyError::MissingOptions(question_type.to_string()));
    }

    Ok(Some(options))
}
