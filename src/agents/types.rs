use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::errors::{AgentError, AgentResult};

/// A single question parsed out of free text by the Question Parser
///
/// Field names are part of the contract with the model and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionParserOutput {
    pub text: String,
    pub question_type: String,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub question_options: Map<String, Value>,
}

/// Summary of a survey built by the Survey Parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyParserOutput {
    pub survey_id: String,
    pub name: String,
    pub description: String,
    pub question_count: u32,
}

/// Schema handed to the model when an agent must answer in a fixed shape
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: &'static str,
    pub schema: Value,
}

/// Shape of an agent's final answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    Text,
    QuestionParser,
    SurveyParser,
}

impl OutputType {
    pub fn name(&self) -> &'static str {
        match self {
            OutputType::Text => "text",
            OutputType::QuestionParser => "QuestionParserOutput",
            OutputType::SurveyParser => "SurveyParserOutput",
        }
    }

    /// JSON schema for structured outputs, `None` for free text
    pub fn schema(&self) -> Option<OutputSchema> {
        let schema = match self {
            OutputType::Text => return None,
            OutputType::QuestionParser => json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string", "description": "The text of the question" },
                    "question_type": {
                        "type": "string",
                        "description": "The type of question (RADIO, MULTIPLE_CHOICE, etc.)"
                    },
                    "options": {
                        "type": ["array", "null"],
                        "items": { "type": "string" },
                        "description": "Options for choice-based questions"
                    },
                    "question_options": {
                        "type": "object",
                        "description": "Additional options for the question"
                    }
                },
                "required": ["text", "question_type"]
            }),
            OutputType::SurveyParser => json!({
                "type": "object",
                "properties": {
                    "survey_id": { "type": "string", "description": "The ID of the created survey" },
                    "name": { "type": "string", "description": "The name of the survey" },
                    "description": { "type": "string", "description": "The description of the survey" },
                    "question_count": { "type": "integer", "description": "The number of questions parsed" }
                },
                "required": ["survey_id", "name", "description", "question_count"]
            }),
        };

        Some(OutputSchema {
            name: self.name(),
            schema,
        })
    }

    /// Checks the shape of a final answer
    ///
    /// Returns the normalized JSON for structured outputs and `None` for
    /// free text. Only the shape is checked, not whether the values make
    /// sense.
    pub fn validate(&self, raw: &str) -> AgentResult<Option<Value>> {
        match self {
            OutputType::Text => Ok(None),
            OutputType::QuestionParser => self.parse::<QuestionParserOutput>(raw).map(Some),
            OutputType::SurveyParser => self.parse::<SurveyParserOutput>(raw).map(Some),
        }
    }

    fn parse<T: DeserializeOwned + Serialize>(&self, raw: &str) -> AgentResult<Value> {
        let parsed: T =
            serde_json::from_str(strip_code_fence(raw)).map_err(|e| AgentError::InvalidOutput {
                schema: self.name().to_string(),
                reason: e.to_string(),
            })?;
        Ok(serde_json::to_value(parsed)?)
    }
}

/// Models often wrap JSON answers in a markdown fence
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_output_is_not_validated() {
        assert_eq!(OutputType::Text.validate("anything").unwrap(), None);
        assert!(OutputType::Text.schema().is_none());
    }

    #[test]
    fn question_output_defaults_optional_fields() {
        let value = OutputType::QuestionParser
            .validate(r#"{"text": "How many hours?", "question_type": "NUMERIC"}"#)
            .unwrap()
            .unwrap();

        assert_eq!(value["options"], Value::Null);
        assert_eq!(value["question_options"], json!({}));
    }

    #[test]
    fn survey_output_requires_every_field() {
        let err = OutputType::SurveyParser
            .validate(r#"{"survey_id": "abc", "name": "S"}"#)
            .unwrap_err();

        assert!(matches!(err, AgentError::InvalidOutput { ref schema, .. } if schema == "SurveyParserOutput"));
    }

    #[test]
    fn fenced_json_is_accepted() {
        let raw = "```json\n{\"survey_id\": \"1\", \"name\": \"S\", \"description\": \"\", \"question_count\": 2}\n```";
        let value = OutputType::SurveyParser.validate(raw).unwrap().unwrap();
        assert_eq!(value["question_count"], 2);
    }

    #[test]
    fn schemas_name_their_contract_fields() {
        let schema = OutputType::QuestionParser.schema().unwrap();
        for field in ["text", "question_type", "options", "question_options"] {
            assert!(schema.schema["properties"].get(field).is_some());
        }
        let schema = OutputType::SurveyParser.schema().unwrap();
        for field in ["survey_id", "name", "description", "question_count"] {
            assert!(schema.schema["properties"].get(field).is_some());
        }
    }
}
