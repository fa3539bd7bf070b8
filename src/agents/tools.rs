// Tool surface exposed to the language model
//
// Each tool has a fixed name and a JSON schema. The runner looks tools up
// by name and hands the decoded arguments to `SurveyTools`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::repositories::SurveyRepository;
use crate::domain::survey::{
    Question, QuestionOptions, QuestionType, QuestionUpdate, Survey, SurveyError, SurveyEvent,
    SurveyResult,
};
use crate::domain::SurveyContext;

/// Names of the tools the model may call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    ListSurveys,
    CreateSurvey,
    AddQuestion,
    EditQuestion,
    DeleteQuestion,
}

impl ToolName {
    pub const ALL: [ToolName; 5] = [
        ToolName::ListSurveys,
        ToolName::CreateSurvey,
        ToolName::AddQuestion,
        ToolName::EditQuestion,
        ToolName::DeleteQuestion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::ListSurveys => "list_surveys",
            ToolName::CreateSurvey => "create_survey",
            ToolName::AddQuestion => "add_question",
            ToolName::EditQuestion => "edit_question",
            ToolName::DeleteQuestion => "delete_question",
        }
    }

    /// Provider-agnostic function definition for this tool
    pub fn definition(&self) -> Value {
        match self {
            ToolName::ListSurveys => json!({
                "name": "list_surveys",
                "description": "List every survey with its id, name, description and question count.",
                "parameters": {
                    "type": "object",
                    "properties": {},
                    "required": []
                }
            }),
            ToolName::CreateSurvey => json!({
                "name": "create_survey",
                "description": "Create a new, empty survey. Returns the survey_id to use when adding questions.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "description": "Survey name. Must not be empty." },
                        "description": { "type": "string", "description": "Short description of the survey's purpose." }
                    },
                    "required": ["name"]
                }
            }),
            ToolName::AddQuestion => json!({
                "name": "add_question",
                "description": "Append a question to a survey. Choice types (RADIO, MULTIPLE_CHOICE, DROPDOWN) need a non-empty options list.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "survey_id": { "type": "string", "description": "Id of the survey to add to." },
                        "text": { "type": "string", "description": "The question text." },
                        "question_type": {
                            "type": "string",
                            "enum": QuestionType::ALL.iter().map(QuestionType::as_str).collect::<Vec<_>>()
                        },
                        "options": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "Answer options for choice types."
                        },
                        "question_options": {
                            "type": "object",
                            "description": "Question settings such as {\"required\": true, \"min_value\": 0}."
                        }
                    },
                    "required": ["survey_id", "text", "question_type"]
                }
            }),
            ToolName::EditQuestion => json!({
                "name": "edit_question",
                "description": "Change fields of an existing question. Only the supplied fields are updated.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "survey_id": { "type": "string" },
                        "question_id": { "type": "string" },
                        "text": { "type": "string" },
                        "question_type": {
                            "type": "string",
                            "enum": QuestionType::ALL.iter().map(QuestionType::as_str).collect::<Vec<_>>()
                        },
                        "options": { "type": "array", "items": { "type": "string" } },
                        "question_options": { "type": "object" }
                    },
                    "required": ["survey_id", "question_id"]
                }
            }),
            ToolName::DeleteQuestion => json!({
                "name": "delete_question",
                "description": "Remove a question from a survey.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "survey_id": { "type": "string" },
                        "question_id": { "type": "string" }
                    },
                    "required": ["survey_id", "question_id"]
                }
            }),
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| ToolError::UnknownTool(s.to_string()))
    }
}

/// Return the complete set of tool definitions
pub fn tool_definitions() -> Vec<Value> {
    ToolName::ALL.iter().map(ToolName::definition).collect()
}

/// Failure of a single tool call, reported back to the model
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: ToolName, reason: String },

    #[error(transparent)]
    Survey(#[from] SurveyError),
}

impl ToolError {
    /// JSON payload handed back to the model in place of a result
    pub fn to_result(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

/// Element returned by `list_surveys`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveySummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub question_count: usize,
}

impl From<&Survey> for SurveySummary {
    fn from(survey: &Survey) -> Self {
        Self {
            id: survey.id(),
            name: survey.name().to_string(),
            description: survey.description().to_string(),
            question_count: survey.question_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedSurvey {
    pub survey_id: Uuid,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedQuestion {
    pub question_id: Uuid,
    pub survey_id: Uuid,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedQuestion {
    pub deleted: bool,
    pub question_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct CreateSurveyArgs {
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct AddQuestionArgs {
    survey_id: String,
    text: String,
    question_type: String,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    question_options: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct EditQuestionArgs {
    survey_id: String,
    question_id: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    question_type: Option<String>,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    question_options: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct DeleteQuestionArgs {
    survey_id: String,
    question_id: String,
}

/// Survey CRUD operations callable by the agents
///
/// Cheap to clone; clones share the repository and the write lock.
/// Every mutation works on a copy of the aggregate and is persisted only
/// when it succeeds, so a failed call never changes stored state.
#[derive(Clone)]
pub struct SurveyTools {
    repository: Arc<dyn SurveyRepository>,
    write_lock: Arc<Mutex<()>>,
}

impl SurveyTools {
    pub fn new(repository: Arc<dyn SurveyRepository>) -> Self {
        Self {
            repository,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Lists surveys in creation order
    pub async fn list_surveys(&self, context: &SurveyContext) -> SurveyResult<Vec<SurveySummary>> {
        let surveys = self.repository.list().await?;
        debug!(
            session_id = %context.session_id,
            count = surveys.len(),
            "Listed surveys"
        );
        Ok(surveys.iter().map(SurveySummary::from).collect())
    }

    pub async fn create_survey(&self, name: &str, description: &str) -> SurveyResult<CreatedSurvey> {
        let (survey, events) = Survey::new(name.to_string(), description.to_string())?;

        let _guard = self.write_lock.lock().await;
        self.repository.save(&survey).await?;
        events.iter().for_each(log_event);

        Ok(CreatedSurvey {
            survey_id: survey.id(),
            name: survey.name().to_string(),
            description: survey.description().to_string(),
        })
    }

    pub async fn add_question(
        &self,
        survey_id: Uuid,
        text: &str,
        question_type: &str,
        options: Option<Vec<String>>,
        question_options: Option<Value>,
    ) -> SurveyResult<CreatedQuestion> {
        let question_type: QuestionType = question_type.parse()?;
        let question_options = QuestionOptions::from_value(question_options.unwrap_or(Value::Null))?;

        let _guard = self.write_lock.lock().await;
        let mut survey = self.load(survey_id).await?;
        let (question_id, event) =
            survey.add_question(text.to_string(), question_type, options, question_options)?;
        self.repository.save(&survey).await?;
        log_event(&event);

        Ok(CreatedQuestion {
            question_id,
            survey_id,
            position: survey.question_count() - 1,
        })
    }

    /// Applies a partial update and returns the updated question
    pub async fn edit_question(
        &self,
        survey_id: Uuid,
        question_id: Uuid,
        update: QuestionUpdate,
    ) -> SurveyResult<Question> {
        let _guard = self.write_lock.lock().await;
        let mut survey = self.load(survey_id).await?;
        let event = survey.edit_question(question_id, update)?;
        self.repository.save(&survey).await?;
        log_event(&event);

        survey
            .question(question_id)
            .cloned()
            .ok_or(SurveyError::QuestionNotFound(question_id))
    }

    pub async fn delete_question(
        &self,
        survey_id: Uuid,
        question_id: Uuid,
    ) -> SurveyResult<DeletedQuestion> {
        let _guard = self.write_lock.lock().await;
        let mut survey = self.load(survey_id).await?;
        let event = survey.delete_question(question_id)?;
        self.repository.save(&survey).await?;
        log_event(&event);

        Ok(DeletedQuestion {
            deleted: true,
            question_id,
        })
    }

    /// Fetches one survey with all its questions
    pub async fn survey(&self, survey_id: Uuid) -> SurveyResult<Survey> {
        self.load(survey_id).await
    }

    /// Invokes a tool by name with JSON arguments
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Value,
        context: &SurveyContext,
    ) -> Result<Value, ToolError> {
        let tool: ToolName = name.parse()?;

        let result = match tool {
            ToolName::ListSurveys => to_value(self.list_surveys(context).await?),
            ToolName::CreateSurvey => {
                let args: CreateSurveyArgs = decode(tool, arguments)?;
                to_value(self.create_survey(&args.name, &args.description).await?)
            }
            ToolName::AddQuestion => {
                let args: AddQuestionArgs = decode(tool, arguments)?;
                let survey_id = parse_survey_ref(&args.survey_id)?;
                to_value(
                    self.add_question(
                        survey_id,
                        &args.text,
                        &args.question_type,
                        args.options,
                        args.question_options,
                    )
                    .await?,
                )
            }
            ToolName::EditQuestion => {
                let args: EditQuestionArgs = decode(tool, arguments)?;
                let survey_id = parse_survey_ref(&args.survey_id)?;
                let question_id = self.resolve_question_ref(survey_id, &args.question_id).await?;
                let update = QuestionUpdate {
                    text: args.text,
                    question_type: args
                        .question_type
                        .as_deref()
                        .map(str::parse::<QuestionType>)
                        .transpose()
                        .map_err(|e| SurveyError::InvalidFieldValue(e.to_string()))?,
                    options: args.options,
                    question_options: args
                        .question_options
                        .map(QuestionOptions::from_value)
                        .transpose()?,
                };
                to_value(
                    self.edit_question(survey_id, question_id, update)
                        .await?,
                )
            }
            ToolName::DeleteQuestion => {
                let args: DeleteQuestionArgs = decode(tool, arguments)?;
                let survey_id = parse_survey_ref(&args.survey_id)?;
                let question_id = self.resolve_question_ref(survey_id, &args.question_id).await?;
                to_value(
                    self.delete_question(survey_id, question_id)
                        .await?,
                )
            }
        };

        result.map_err(|e| ToolError::InvalidArguments {
            tool,
            reason: e.to_string(),
        })
    }

    /// Parses a question id, reporting a missing survey before a bad question id
    async fn resolve_question_ref(&self, survey_id: Uuid, raw: &str) -> SurveyResult<Uuid> {
        match Uuid::parse_str(raw.trim()) {
            Ok(id) => Ok(id),
            Err(_) => {
                self.load(survey_id).await?;
                Err(SurveyError::UnknownQuestionRef(raw.to_string()))
            }
        }
    }

    async fn load(&self, survey_id: Uuid) -> SurveyResult<Survey> {
        self.repository
            .find_by_id(survey_id)
            .await?
            .ok_or(SurveyError::SurveyNotFound(survey_id))
    }
}

fn decode<T: serde::de::DeserializeOwned>(tool: ToolName, arguments: Value) -> Result<T, ToolError> {
    // Some providers send `null` for argument-less calls
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments {
        tool,
        reason: e.to_string(),
    })
}

fn parse_survey_ref(raw: &str) -> SurveyResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| SurveyError::UnknownSurveyRef(raw.to_string()))
}

fn to_value<T: Serialize>(value: T) -> serde_json::Result<Value> {
    serde_json::to_value(value)
}

fn log_event(event: &SurveyEvent) {
    info!(
        event = event.kind(),
        survey_id = %event.survey_id(),
        "Survey updated"
    );
}
