use uuid::Uuid;

use super::value_objects::QuestionType;

/// Domain events that occur within the Survey aggregate
///
/// Every successful mutation returns the event it produced. The tool layer
/// logs them; nothing is event-sourced.
///
/// # Example
/// ```
/// use survey_agents::domain::survey::events::SurveyEvent;
/// use uuid::Uuid;
///
/// let event = SurveyEvent::Created {
///     survey_id: Uuid::new_v4(),
///     name: "Customer Satisfaction".to_string(),
/// };
/// assert_eq!(event.kind(), "survey_created");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SurveyEvent {
    /// Fired when a survey is created
    Created { survey_id: Uuid, name: String },
    /// Fired when a question is appended
    QuestionAdded {
        survey_id: Uuid,
        question_id: Uuid,
        question_type: QuestionType,
        position: usize,
    },
    /// Fired when a question's fields change
    QuestionEdited { survey_id: Uuid, question_id: Uuid },
    /// Fired when a question is removed
    QuestionDeleted { survey_id: Uuid, question_id: Uuid },
}

impl SurveyEvent {
    /// Returns the survey_id for this event
    pub fn survey_id(&self) -> Uuid {
        match self {
            SurveyEvent::Created { survey_id, .. }
            | SurveyEvent::QuestionAdded { survey_id, .. }
            | SurveyEvent::QuestionEdited { survey_id, .. }
            | SurveyEvent::QuestionDeleted { survey_id, .. } => *survey_id,
        }
    }

    /// Stable name used as a tracing field
    pub fn kind(&self) -> &'static str {
        match self {
            SurveyEvent::Created { .. } => "survey_created",
            SurveyEvent::QuestionAdded { .. } => "question_added",
            SurveyEvent::QuestionEdited { .. } => "question_edited",
            SurveyEvent::QuestionDeleted { .. } => "question_deleted",
        }
    }
}
