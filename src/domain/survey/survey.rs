use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::errors::{SurveyError, SurveyResult};
use super::events::SurveyEvent;
use super::question::{Question, QuestionUpdate};
use super::value_objects::{QuestionOptions, QuestionType};

/// Survey aggregate root
///
/// Owns an ordered list of questions. All question mutations go through
/// the aggregate so the ordering and invariants hold.
///
/// # Invariants
/// - Name cannot be empty
/// - Question ids are unique within the survey
/// - Questions keep the order they were added in
/// - A failed mutation leaves the survey unchanged
///
/// # Example
/// ```
/// use survey_agents::domain::survey::Survey;
///
/// let (survey, events) = Survey::new(
///     "Customer Satisfaction".to_string(),
///     "Q3 feedback".to_string(),
/// ).expect("valid survey");
///
/// assert_eq!(survey.name(), "Customer Satisfaction");
/// assert_eq!(events.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Survey {
    id: Uuid,
    name: String,
    description: String,
    questions: Vec<Question>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Survey {
    /// Creates a new Survey aggregate
    ///
    /// # Returns
    /// * `Ok((Survey, Vec<SurveyEvent>))` - New survey and events generated
    /// * `Err(SurveyError::InvalidInput)` - If the name is empty or blank
    pub fn new(name: String, description: String) -> SurveyResult<(Self, Vec<SurveyEvent>)> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(SurveyError::InvalidInput(
                "survey name cannot be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let survey = Self {
            id: Uuid::new_v4(),
            name,
            description: description.trim().to_string(),
            questions: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let events = vec![SurveyEvent::Created {
            survey_id: survey.id,
            name: survey.name.clone(),
        }];

        Ok((survey, events))
    }

    /// Appends a question to the end of the survey
    ///
    /// # Returns
    /// * `Ok((Uuid, SurveyEvent))` - The new question's id and the event
    /// * `Err(SurveyError::MissingOptions)` - Choice type without options
    pub fn add_question(
        &mut self,
        text: String,
        question_type: QuestionType,
        options: Option<Vec<String>>,
        question_options: QuestionOptions,
    ) -> SurveyResult<(Uuid, SurveyEvent)> {
        let question = Question::new(text, question_type, options, question_options)?;
        let question_id = question.id();
        let position = self.questions.len();

        self.questions.push(question);
        self.touch();

        Ok((
            question_id,
            SurveyEvent::QuestionAdded {
                survey_id: self.id,
                question_id,
                question_type,
                position,
            },
        ))
    }

    /// Applies a partial update to one question
    pub fn edit_question(
        &mut self,
        question_id: Uuid,
        update: QuestionUpdate,
    ) -> SurveyResult<SurveyEvent> {
        let question = self
            .questions
            .iter_mut()
            .find(|q| q.id() == question_id)
            .ok_or(SurveyError::QuestionNotFound(question_id))?;

        question.apply(update)?;
        self.touch();

        Ok(SurveyEvent::QuestionEdited {
            survey_id: self.id,
            question_id,
        })
    }

    /// Removes a question, preserving the order of the rest
    pub fn delete_question(&mut self, question_id: Uuid) -> SurveyResult<SurveyEvent> {
        let index = self
            .questions
            .iter()
            .position(|q| q.id() == question_id)
            .ok_or(SurveyError::QuestionNotFound(question_id))?;

        self.questions.remove(index);
        self.touch();

        Ok(SurveyEvent::QuestionDeleted {
            survey_id: self.id,
            question_id,
        })
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, question_id: Uuid) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == question_id)
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Reconstructs a Survey from persistence layer data
    ///
    /// Bypasses validation; only repository implementations should call it.
    pub fn from_persistence(
        id: Uuid,
        name: String,
        description: String,
        questions: Vec<Question>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            questions,
            created_at,
            updated_at,
        }
    }
}
